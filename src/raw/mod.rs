mod arena;
mod handle;
mod key;
mod node;
mod raw_bptree;

pub(crate) use handle::Handle;
pub(crate) use node::LeafNode;
pub(crate) use raw_bptree::RawBPTree;
