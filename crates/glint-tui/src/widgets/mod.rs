mod help;
mod mutation_log;
mod page_view;
mod status_bar;

pub use help::HelpPopup;
pub use mutation_log::MutationLogWidget;
pub use page_view::PageViewWidget;
pub use status_bar::StatusBarWidget;
