pub mod convert;
pub mod plan_data;
pub mod storage;

pub use convert::{ConvertError, to_scenarios, to_simulation_input};
pub use plan_data::PlanData;
pub use storage::{StorageError, load_plan, save_plan};
