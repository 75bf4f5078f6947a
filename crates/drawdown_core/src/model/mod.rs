mod profile;
mod rates;
mod results;
mod streams;

pub use profile::{Account, AccountKind, Budget, NetWorth, Profile, net_worth};
pub use rates::{CumulativeIndex, RateSchedule, RateStage};
pub use results::{MonthRecord, Outcome, SimulationResult, Trajectory};
pub use streams::{Direction, Flow, Frequency, Indexation, OneTimeEvent, RecurringStream};
