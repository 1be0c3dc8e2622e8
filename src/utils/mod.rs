pub mod item_list;
