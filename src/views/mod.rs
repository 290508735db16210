pub mod card;
pub mod dot_loader;
pub mod no_support;
pub mod onboarding;
pub mod results;

pub use card::{close_card, render_card};
pub use dot_loader::{remove_dot_loader, render_dot_loader};
pub use no_support::{render_no_support, show_no_support, show_setup_failure};
pub use onboarding::{mount_onboarding, DomCarouselView};
pub use results::{results_container, DomResultView};
