pub mod classifier_trait;
pub mod svm;

pub use classifier_trait::ClassifierModel;
pub use svm::SvmClassifier;
