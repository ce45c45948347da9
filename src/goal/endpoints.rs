//! Route handlers for savings goals.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    app_state::lock_connection,
    auth::UserID,
    database_id::IdQuery,
    extract::{JsonBody, QueryParams},
    goal::{
        GoalFields, GoalProgress, GoalState,
        core::{GoalId, delete_goal, update_goal},
        create_goal, get_goals, get_owned_goal,
    },
};

/// The fields of a new goal. `currentAmount` defaults to zero.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoalData {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub deadline: Date,
    #[serde(default)]
    pub category: Option<String>,
}

/// The replacement fields for an existing goal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalData {
    pub id: GoalId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Date,
    #[serde(default)]
    pub category: Option<String>,
}

/// Create a goal for the session user.
pub async fn create_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<NewGoalData>,
) -> Result<(StatusCode, Json<GoalProgress>), Error> {
    let fields = GoalFields::new(
        &data.title,
        data.description.as_deref(),
        data.target_amount,
        data.current_amount,
        data.deadline,
        data.category.as_deref(),
    )?;

    let connection = lock_connection(&state.db_connection)?;
    let goal = create_goal(user_id, fields, &connection)?;

    Ok((StatusCode::CREATED, Json(goal.into())))
}

/// List the session user's goals, soonest deadline first.
pub async fn get_goals_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<GoalProgress>>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let goals = get_goals(user_id, &connection)?;

    Ok(Json(goals.into_iter().map(GoalProgress::from).collect()))
}

/// Replace one of the session user's goals.
pub async fn update_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<UpdateGoalData>,
) -> Result<Json<GoalProgress>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let goal = get_owned_goal(data.id, user_id, &connection)?;

    let fields = GoalFields::new(
        &data.title,
        data.description.as_deref(),
        data.target_amount,
        data.current_amount,
        data.deadline,
        data.category.as_deref(),
    )?;
    let updated = update_goal(goal.id, fields, &connection)?;

    Ok(Json(updated.into()))
}

/// Delete one of the session user's goals.
pub async fn delete_goal_endpoint(
    State(state): State<GoalState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let goal = get_owned_goal(query.id, user_id, &connection)?;

    delete_goal(goal.id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod goal_endpoint_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use serde_json::Value;
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        database_id::IdQuery,
        extract::{JsonBody, QueryParams},
        goal::GoalState,
        test_utils::{create_test_user, get_test_connection, shared_connection},
    };

    use super::{
        NewGoalData, UpdateGoalData, create_goal_endpoint, delete_goal_endpoint,
        get_goals_endpoint, update_goal_endpoint,
    };

    fn get_state() -> (GoalState, UserID, UserID) {
        let connection = get_test_connection();
        let alice = create_test_user("a@example.com", &connection);
        let bob = create_test_user("b@example.com", &connection);

        (
            GoalState {
                db_connection: shared_connection(connection),
            },
            alice,
            bob,
        )
    }

    fn emergency_fund() -> NewGoalData {
        NewGoalData {
            title: "Emergency fund".to_owned(),
            description: Some("Three months of expenses".to_owned()),
            target_amount: 6000.0,
            current_amount: 1500.0,
            deadline: date!(2026 - 12 - 31),
            category: None,
        }
    }

    #[tokio::test]
    async fn created_goal_has_progress_and_defaults() {
        let (state, alice, _) = get_state();

        let (status, goal) =
            create_goal_endpoint(State(state), Extension(alice), JsonBody(emergency_fund()))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(goal.progress, 25.0);
        assert_eq!(goal.goal.category, "Savings");

        let json: Value = serde_json::to_value(&goal.0).unwrap();
        assert_eq!(json["targetAmount"], 6000.0);
        assert_eq!(json["progress"], 25.0);
        assert_eq!(json["deadline"], "2026-12-31");
        assert!(json["createdAt"].is_string());
    }

    #[tokio::test]
    async fn list_returns_only_own_goals() {
        let (state, alice, bob) = get_state();
        create_goal_endpoint(State(state.clone()), Extension(alice), JsonBody(emergency_fund()))
            .await
            .unwrap();

        let alices = get_goals_endpoint(State(state.clone()), Extension(alice))
            .await
            .unwrap();
        let bobs = get_goals_endpoint(State(state), Extension(bob)).await.unwrap();

        assert_eq!(alices.len(), 1);
        assert!(bobs.is_empty());
    }

    #[tokio::test]
    async fn update_recomputes_progress() {
        let (state, alice, bob) = get_state();
        let (_, goal) =
            create_goal_endpoint(State(state.clone()), Extension(alice), JsonBody(emergency_fund()))
                .await
                .unwrap();
        let data = || UpdateGoalData {
            id: goal.goal.id,
            title: "Emergency fund".to_owned(),
            description: None,
            target_amount: 6000.0,
            current_amount: 9000.0,
            deadline: date!(2026 - 12 - 31),
            category: Some("Safety".to_owned()),
        };

        let forbidden =
            update_goal_endpoint(State(state.clone()), Extension(bob), JsonBody(data())).await;
        assert_eq!(forbidden.unwrap_err(), Error::Forbidden);

        let updated = update_goal_endpoint(State(state), Extension(alice), JsonBody(data()))
            .await
            .unwrap();
        assert_eq!(updated.progress, 100.0);
        assert_eq!(updated.goal.category, "Safety");
    }

    #[tokio::test]
    async fn delete_checks_owner() {
        let (state, alice, bob) = get_state();
        let (_, goal) =
            create_goal_endpoint(State(state.clone()), Extension(alice), JsonBody(emergency_fund()))
                .await
                .unwrap();
        let query = || QueryParams(IdQuery { id: goal.goal.id });

        assert_eq!(
            delete_goal_endpoint(State(state.clone()), Extension(bob), query()).await,
            Err(Error::Forbidden)
        );
        assert_eq!(
            delete_goal_endpoint(State(state.clone()), Extension(alice), query()).await,
            Ok(StatusCode::NO_CONTENT)
        );
        assert_eq!(
            delete_goal_endpoint(State(state), Extension(alice), query()).await,
            Err(Error::NotFound)
        );
    }
}
