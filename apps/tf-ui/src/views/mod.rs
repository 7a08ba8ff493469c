pub mod inspect_view;
pub mod module_view;
pub mod pid_view;
pub mod plot_view;
pub mod run_view;

pub use inspect_view::{
    ComponentKindChoice, ControlBlockKindChoice, InspectActions, InspectView, NewComponentSpec,
    NodeKindChoice,
};
pub use module_view::ModuleView;
pub use pid_view::PidView;
pub use plot_view::PlotView;
pub use run_view::RunView;
