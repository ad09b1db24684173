// Entity Store - one repository per relation
// Each repository owns the row <-> model mapping for its relation. Reads run
// through BlogDatabase::with_deadline, writes through BlogDatabase::run_write

pub mod category_repository;
pub mod comment_repository;
pub mod like_repository;
pub mod post_repository;

pub use category_repository::CategoryRepository;
pub use comment_repository::CommentRepository;
pub use like_repository::LikeRepository;
pub use post_repository::PostRepository;

/// Store clock at millisecond precision, evaluated once per statement.
pub(crate) const STORE_NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";
