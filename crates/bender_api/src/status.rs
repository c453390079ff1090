//! Outcome code to transport status mapping, per operation.

use bender_core::ErrorCode;

/// Boundary operation a status is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

const INTERNAL_ERROR: u16 = 500;

/// Maps `errno` to a status code for `operation`.
///
/// `row_count` only matters for `Get`, where `OK` with no rows is a 404.
/// Codes an operation never produces fall back to 500.
pub fn status_for(operation: Operation, errno: ErrorCode, row_count: usize) -> u16 {
    match (operation, errno) {
        (Operation::List, ErrorCode::Ok) => 200,
        (Operation::Get, ErrorCode::Ok) if row_count == 0 => 404,
        (Operation::Get, ErrorCode::Ok) => 200,
        (Operation::Create, ErrorCode::Ok) => 201,
        (Operation::Create, ErrorCode::DupId) => 400,
        (Operation::Create, ErrorCode::DupTitle) => 409,
        (Operation::Update, ErrorCode::Ok) => 202,
        (Operation::Update, ErrorCode::NoExist) => 400,
        (Operation::Update, ErrorCode::DupTitle) => 409,
        (Operation::Delete, ErrorCode::Ok) => 200,
        (Operation::Delete, ErrorCode::NoExist) => 400,
        (_, ErrorCode::BadParams) => 400,
        _ => INTERNAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::{status_for, Operation};
    use bender_core::ErrorCode;

    #[test]
    fn get_without_rows_is_not_found() {
        assert_eq!(status_for(Operation::Get, ErrorCode::Ok, 0), 404);
        assert_eq!(status_for(Operation::Get, ErrorCode::Ok, 1), 200);
    }

    #[test]
    fn write_statuses_follow_operation() {
        assert_eq!(status_for(Operation::Create, ErrorCode::Ok, 0), 201);
        assert_eq!(status_for(Operation::Create, ErrorCode::DupTitle, 0), 409);
        assert_eq!(status_for(Operation::Update, ErrorCode::Ok, 0), 202);
        assert_eq!(status_for(Operation::Update, ErrorCode::NoExist, 0), 400);
        assert_eq!(status_for(Operation::Delete, ErrorCode::NoExist, 0), 400);
    }

    #[test]
    fn store_and_unknown_errors_are_internal() {
        for operation in [
            Operation::List,
            Operation::Get,
            Operation::Create,
            Operation::Update,
            Operation::Delete,
        ] {
            assert_eq!(status_for(operation, ErrorCode::DbErr, 0), 500);
            assert_eq!(status_for(operation, ErrorCode::Un, 0), 500);
        }
    }

    #[test]
    fn unexpected_code_for_operation_is_internal() {
        assert_eq!(status_for(Operation::List, ErrorCode::DupTitle, 0), 500);
        assert_eq!(status_for(Operation::Delete, ErrorCode::DupTitle, 0), 500);
    }
}
