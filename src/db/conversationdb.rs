// db/conversationdb.rs
//
// Messaging collaborator surface: the chat subsystem itself lives elsewhere;
// the engine only creates the linked conversation and stores its id.
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::consultationmodel::Conversation;

#[async_trait]
pub trait ConversationExt {
    async fn create_conversation(
        &self,
        participant_ids: Vec<Uuid>,
        case_id: Option<Uuid>,
        kind: String,
        title: String,
    ) -> Result<Conversation, Error>;
}

#[async_trait]
impl ConversationExt for DBClient {
    async fn create_conversation(
        &self,
        participant_ids: Vec<Uuid>,
        case_id: Option<Uuid>,
        kind: String,
        title: String,
    ) -> Result<Conversation, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            INSERT INTO conversations (participant_ids, case_id, kind, title)
            VALUES ($1, $2, $3, $4)
            RETURNING id, participant_ids, case_id, kind, title, created_at
            "#,
        )
        .bind(participant_ids)
        .bind(case_id)
        .bind(kind)
        .bind(title)
        .fetch_one(&self.pool)
        .await
    }
}
