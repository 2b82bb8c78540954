use crate::domain::user::CurrentUser;
use crate::repository::AccountGateway;
use crate::repository::cache::ProductListingCache;

use super::{ServiceError, ServiceResult};

/// The operator shown in the account menu.
pub async fn current_user<R>(repo: &R) -> ServiceResult<CurrentUser>
where
    R: AccountGateway + ?Sized,
{
    repo.current_user().await.map_err(|e| {
        log::error!("Failed to load current user: {e}");
        ServiceError::from(e)
    })
}

/// Ends the session and drops every cached listing.
pub async fn logout<R>(repo: &R, cache: &ProductListingCache) -> ServiceResult<()>
where
    R: AccountGateway + ?Sized,
{
    match repo.logout().await {
        Ok(()) => {
            cache.clear();
            log::info!("Logged out");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to log out: {e}");
            Err(ServiceError::from(e))
        }
    }
}
