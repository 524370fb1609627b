use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    // Success with data and message
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    // Success with message
    pub fn success_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }

    // Error with data (e.g., balance arithmetic detail)
    pub fn error_with_data(data: T, message: &str) -> Self {
        Self {
            success: false,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }

    // Error with message only
    pub fn error_message(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

impl ApiResponse<()> {
    // Error response (no data)
    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

/// Pagination block for list responses.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total: i64,
    pub limit: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            ((total + i64::from(limit) - 1) / i64::from(limit)) as u32
        };

        Self {
            current_page: page,
            total_pages,
            total,
            limit,
            has_next_page: i64::from(page) * i64::from(limit) < total,
            has_prev_page: page > 1,
        }
    }
}

/// Same block as [`Pagination`] but keyed `totalEmployees`, matching the
/// employee-list contract.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_employees: i64,
    pub limit: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl EmployeePagination {
    pub fn new(page: u32, limit: u32, total_employees: i64) -> Self {
        let p = Pagination::new(page, limit, total_employees);
        Self {
            current_page: p.current_page,
            total_pages: p.total_pages,
            total_employees,
            limit,
            has_next_page: p.has_next_page,
            has_prev_page: p.has_prev_page,
        }
    }
}
