mod app_dto;

pub use app_dto::{DraftUpdateDto, ReportFormDto, SelectRoleDto, SelectTabDto};
