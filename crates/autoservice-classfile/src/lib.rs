//! Minimal JVM class file reader.
//!
//! Reads what service registration needs from compiled classes: the class
//! name, access flags, direct supertypes and class-level annotations
//! (including `kotlin.Metadata`). Code, fields and methods are skipped.
//!
//! ```
//! use autoservice_classfile::{ClassFile, ClassFileBuilder};
//!
//! let bytes = ClassFileBuilder::new("com/example/Impl")
//!     .interface("com/example/Service")
//!     .build();
//! let class = ClassFile::parse(&bytes).unwrap();
//! assert_eq!(class.interfaces, ["com/example/Service"]);
//! ```

pub mod access;
pub mod annotation;
pub mod builder;
pub mod class_file;
pub mod constant_pool;
pub mod reader;

pub use access::AccessFlags;
pub use annotation::{Annotation, ConstValue, ElementTag, ElementValue};
pub use builder::ClassFileBuilder;
pub use class_file::{ClassFile, KOTLIN_METADATA, KotlinClassKind};
pub use constant_pool::{Constant, ConstantPool, ConstantTag};
pub use reader::ClassReader;
