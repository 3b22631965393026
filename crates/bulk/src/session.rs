use elecmate_core::types::UserId;

/// The signed-in user a bulk action runs on behalf of.
///
/// Credentials stay with the transport; the coordinator only needs to know
/// whose reports it is acting on.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
}

impl Session {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
