pub mod capabilities;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod session;

pub use capabilities::{
    AnswerFallback, CapabilityError, Clock, OrderWarranty, SerialLookup, SystemClock,
    WarrantyLookup, WarrantyStatus,
};
pub use dispatch::{DispatchError, DispatchEvent, DispatchState, Dispatcher, HandlerKind};
pub use domain::customer::{Customer, CustomerId};
pub use domain::order::{Order, OrderId, OrderItem};
pub use domain::product::{Product, ProductId};
pub use errors::TurnError;
pub use session::{Intent, ResolvedIntent, TurnOutcome, TurnRequest, TurnState};
