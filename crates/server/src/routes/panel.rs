//! Role landing pages (`/admin`, `/tienda`).

use crate::middleware::{RequireAdmin, RequireUser};

/// Administrator landing page.
///
/// GET /admin
pub async fn admin(RequireAdmin(user): RequireAdmin) -> String {
    format!("Panel de administración. Hola, {}.", user.username)
}

/// Customer landing page. Administrators may visit it too.
///
/// GET /tienda
pub async fn store(RequireUser(user): RequireUser) -> String {
    format!("Bienvenido a la tienda, {}.", user.username)
}
