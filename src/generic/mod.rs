/*!
Generic structures with no particular tie to the rest of the library.
*/

pub mod deadline;
pub mod index_heap;
pub mod luby;
pub mod pcg;
