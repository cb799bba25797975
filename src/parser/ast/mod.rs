mod declaration;
mod expression;
mod statement;
mod type_expr;
pub mod visitor;

pub use declaration::*;
pub use expression::*;
pub use statement::*;
pub use type_expr::*;
