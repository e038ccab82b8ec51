mod arena;
mod handle;
mod node;
mod raw_rbtree_map;

pub(crate) use raw_rbtree_map::RawRBTreeMap;
