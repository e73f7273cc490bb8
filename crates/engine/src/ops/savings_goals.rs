use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ModelTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, SavingsGoal, savings_goals};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    pub async fn savings_goal(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<SavingsGoal> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal_owned(&db_tx, goal_id, user_id).await?;
            SavingsGoal::try_from(model)
        })
    }

    pub async fn savings_goals(&self, user_id: &str) -> ResultEngine<Vec<SavingsGoal>> {
        with_tx!(self, |db_tx| {
            let models = savings_goals::Entity::find()
                .filter(savings_goals::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(savings_goals::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(SavingsGoal::try_from).collect()
        })
    }

    /// Creates a savings goal. Goals are passive: `current` moves only
    /// through [`Engine::update_savings_goal`], never through transaction
    /// effects.
    pub async fn new_savings_goal(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
        current_minor: i64,
        target_minor: i64,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "savings goal")?;
        if target_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "target_minor must be > 0".to_string(),
            ));
        }
        let created_at = Utc::now();
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let goal = SavingsGoal::new(
                user_id.to_string(),
                name,
                normalize_optional_text(description),
                current_minor,
                target_minor,
                created_at,
            );
            let goal_id = goal.id;
            savings_goals::ActiveModel::from(&goal).insert(&db_tx).await?;
            Ok(goal_id)
        })
    }

    /// Patches a savings goal; `None` fields keep their value.
    pub async fn update_savings_goal(
        &self,
        goal_id: Uuid,
        user_id: &str,
        name: Option<&str>,
        description: Option<&str>,
        current_minor: Option<i64>,
        target_minor: Option<i64>,
    ) -> ResultEngine<()> {
        if let Some(target) = target_minor
            && target <= 0
        {
            return Err(EngineError::InvalidAmount(
                "target_minor must be > 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let model = self.require_goal_owned(&db_tx, goal_id, user_id).await?;

            let mut active: savings_goals::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(normalize_required_name(name, "savings goal")?);
            }
            if let Some(description) = description {
                active.description =
                    ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            if let Some(current) = current_minor {
                active.current_minor = ActiveValue::Set(current);
            }
            if let Some(target) = target_minor {
                active.target_minor = ActiveValue::Set(target);
            }
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn delete_savings_goal(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal_owned(&db_tx, goal_id, user_id).await?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }

    async fn require_goal_owned(
        &self,
        db: &sea_orm::DatabaseTransaction,
        goal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<savings_goals::Model> {
        savings_goals::Entity::find_by_id(goal_id.to_string())
            .filter(savings_goals::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("savings goal not exists".to_string()))
    }
}
