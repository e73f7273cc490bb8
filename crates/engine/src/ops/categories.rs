use uuid::Uuid;

use sea_orm::{
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{Category, CategoryKind, EngineError, ResultEngine, categories, transactions};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Return all categories, ordered by name.
    ///
    /// Categories are global: every user sees the same list.
    pub async fn categories(&self) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let models = categories::Entity::find()
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Category::try_from).collect()
        })
    }

    /// Adds a new global category. Kind is immutable after this.
    pub async fn new_category(&self, name: &str, kind: CategoryKind) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "category")?;
        with_tx!(self, |db_tx| {
            let exists = categories::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let category = Category::new(name, kind);
            let category_id = category.id;
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            Ok(category_id)
        })
    }

    /// Deletes a category.
    ///
    /// Blocked while any transaction references it; budgets for the
    /// category are cascade-deleted by the schema.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;

            let referenced = transactions::Entity::find()
                .filter(transactions::Column::CategoryId.eq(category_id.to_string()))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::Protected(
                    "category is referenced by transactions".to_string(),
                ));
            }

            model.delete(&db_tx).await?;
            Ok(())
        })
    }
}
