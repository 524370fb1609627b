pub(crate) mod macros;

pub mod account;
pub mod leave;

pub use account::{
    Account, AccountInfo, AccountRow, AccountStatus, AddEmployeeInput, AdminAccount, AuthResponse,
    EmployeeAccount, EmployeeListQuery, LoginInput, RegisterInput, Role,
};
pub use leave::{
    ApplyLeaveInput, BalanceVerification, DecidedLeave, EmployeeRef, LeaveBalance,
    LeaveBalanceReport, LeaveListQuery, LeaveRequest, LeaveRequestView, LeaveStatus,
    VerifiedEmployee, VerifiedTotals,
};
