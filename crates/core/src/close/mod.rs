pub mod eligibility;
pub mod service;
pub mod transition;

pub use eligibility::evaluate;
pub use service::ClosingService;
pub use transition::TransitionError;
