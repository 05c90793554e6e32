pub mod anchor_check;
pub mod asset_check;
pub mod bridges_check;
pub mod claims_check;
pub mod csv_table;
pub mod dag_check;
pub mod loss_forms_check;
pub mod project_check;
