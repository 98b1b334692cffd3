pub mod gate;
pub mod login;
pub mod routes;

pub use gate::SessionGate;
pub use login::LoginForm;
pub use routes::{guard, RouteDecision, HOME_ROUTE, REGISTER_ROUTE, SIGN_IN_ROUTE};
