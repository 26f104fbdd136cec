//! UseCase: 会話の作成

use std::sync::Arc;

use crate::domain::{
    Conversation, ConversationRepository, Credentials, IdentityResolver, Participant,
};

use super::error::ConversationError;

/// 会話作成のユースケース
pub struct CreateConversationUseCase {
    identity_resolver: Arc<dyn IdentityResolver>,
    conversation_repository: Arc<dyn ConversationRepository>,
}

impl CreateConversationUseCase {
    pub fn new(
        identity_resolver: Arc<dyn IdentityResolver>,
        conversation_repository: Arc<dyn ConversationRepository>,
    ) -> Self {
        Self {
            identity_resolver,
            conversation_repository,
        }
    }

    /// 呼び出し元と `participants` を参加者とする会話を作成
    ///
    /// 呼び出し元は常に先頭の参加者になる（`participants` に含まれていても重複しない）。
    pub async fn execute(
        &self,
        credentials: &Credentials,
        participants: Vec<Participant>,
    ) -> Result<Conversation, ConversationError> {
        let identity = self.identity_resolver.resolve(credentials).await?;

        let mut all = vec![Participant::new(
            identity.user_id.clone(),
            identity.username,
        )];
        all.extend(
            participants
                .into_iter()
                .filter(|p| p.id != identity.user_id),
        );

        Ok(self.conversation_repository.create(all).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Identity, IdentityError, MockIdentityResolver, UserId, Username},
        infrastructure::repository::InMemoryConversationRepository,
    };
    use hiroba_shared::time::FixedClock;

    fn participant(id: &str) -> Participant {
        Participant::new(UserId::try_from(id).unwrap(), Username::try_from(id).unwrap())
    }

    fn resolver_for(id: &'static str) -> Arc<MockIdentityResolver> {
        let mut resolver = MockIdentityResolver::new();
        resolver.expect_resolve().returning(move |_| {
            Ok(Identity {
                user_id: UserId::try_from(id).unwrap(),
                username: Username::try_from(id).unwrap(),
                email: None,
            })
        });
        Arc::new(resolver)
    }

    #[tokio::test]
    async fn test_create_conversation_includes_caller_first() {
        // テスト項目: 呼び出し元が先頭に 1 度だけ含まれる会話が作成される
        // given (前提条件):
        let repository = Arc::new(InMemoryConversationRepository::new(Arc::new(
            FixedClock::new(0),
        )));
        let usecase = CreateConversationUseCase::new(resolver_for("u1"), repository.clone());

        // when (操作):
        let conversation = usecase
            .execute(
                &Credentials::default(),
                vec![participant("u2"), participant("u1")],
            )
            .await
            .unwrap();

        // then (期待する結果):
        let ids: Vec<&str> = conversation
            .participants
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert!(repository.find_room(&conversation.room_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_conversation_unauthenticated() {
        // テスト項目: 未認証の場合は会話が作成されない
        // given (前提条件):
        let mut resolver = MockIdentityResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Err(IdentityError::MissingCredentials));
        let repository = Arc::new(InMemoryConversationRepository::new(Arc::new(
            FixedClock::new(0),
        )));
        let usecase = CreateConversationUseCase::new(Arc::new(resolver), repository.clone());

        // when (操作):
        let result = usecase
            .execute(&Credentials::default(), vec![participant("u2")])
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ConversationError::Unauthenticated(
                IdentityError::MissingCredentials
            ))
        );
        let u2 = UserId::try_from("u2").unwrap();
        assert!(repository.find_by_participant(&u2).await.unwrap().is_empty());
    }
}
