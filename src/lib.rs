pub mod bundle;
pub mod classifier;
pub mod config;
pub mod extractor;
pub mod keywords;
pub mod rdap;
pub mod report;
pub mod scanner;
pub mod scorer;
pub mod whois;

pub use bundle::{EvidenceBundle, ScanHistory};
pub use classifier::{Classifier, ClassifierResult, Label, LexicalClassifier};
pub use config::Config;
pub use rdap::{OwnershipChecker, OwnershipRecord};
pub use report::ReportRenderer;
pub use scanner::Scanner;
pub use scorer::compute_risk_score;
pub use whois::{RegistrationChecker, RegistrationRecord};
