//! 控制台视图状态
//!
//! 与具体页面无关的可复用状态单元：
//!
//! - `table`: 分页列表状态（筛选条件、页码、行数据、加载标志）
//! - `form`: 表单状态（字段值、校验错误、触碰标记、提交状态）与内置校验规则
//! - `request`: 单次异步调用的数据/加载/错误包装

pub mod form;
pub mod request;
pub mod table;

pub use form::{FieldRule, FormState, Values, Verdict};
pub use request::RequestState;
pub use table::{DEFAULT_PAGE_SIZE, TableState};
