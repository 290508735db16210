pub mod onboarding_viewmodel;
pub mod scanner_viewmodel;

pub use onboarding_viewmodel::{CarouselView, OnboardingController, OnboardingEvent};
pub use scanner_viewmodel::{FrameOutcome, ResultPresenter, ResultView, ScannerViewModel};
