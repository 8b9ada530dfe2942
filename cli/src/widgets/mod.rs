pub mod logo;
pub mod selectable_list;
pub mod util;
pub mod volume_gauge;
