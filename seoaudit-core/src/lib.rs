pub mod alt_text;
pub mod audit;
pub mod error;
pub mod inclusion;
pub mod locale;
pub mod mapping;
pub mod metadata;
pub mod naming;
pub mod report;

pub use alt_text::{AltTextRecord, collect_alt_texts};
pub use audit::{AuditOptions, AuditOutcome, AuditProgressCallback, Auditor, PageAudit, execute_audit};
pub use error::AuditError;
pub use inclusion::{InclusionChecker, InclusionResult};
pub use locale::{extract_base_url, remove_locale_code};
pub use mapping::{MappingEntry, SitemapMapping, find_sitemap_url};
pub use metadata::{AuditFactor, PageMetadata};
pub use naming::{ReportIdentity, report_file_name};
pub use report::ReportFormat;
