mod create;
mod delete;
mod list;
mod show;
mod update;

pub use create::tenant_create;
pub use delete::tenant_delete;
pub use list::tenant_list;
pub use show::tenant_show;
pub use update::tenant_update;
