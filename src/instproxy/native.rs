use crate::bridge::{OpaqueContext, RequestCallback};
use crate::codec::Node;
use std::path::Path;

/// The native installation proxy connection.
///
/// Request functions return the native code synchronously; a non-zero code
/// means the request was refused and `callback` will never be invoked. For an
/// accepted request `callback` is invoked with `context` until a terminal
/// status has been delivered.
pub trait NativeInstallationProxy: Send + Sync {
    fn install(
        &self,
        package: &Path,
        options: &Node,
        callback: RequestCallback,
        context: OpaqueContext,
    ) -> i32;

    fn upgrade(
        &self,
        package: &Path,
        options: &Node,
        callback: RequestCallback,
        context: OpaqueContext,
    ) -> i32;

    fn uninstall(
        &self,
        bundle_id: &str,
        options: &Node,
        callback: RequestCallback,
        context: OpaqueContext,
    ) -> i32;

    fn archive(
        &self,
        app: &str,
        options: &Node,
        callback: RequestCallback,
        context: OpaqueContext,
    ) -> i32;

    fn restore(
        &self,
        app: &str,
        options: &Node,
        callback: RequestCallback,
        context: OpaqueContext,
    ) -> i32;

    fn remove_archive(
        &self,
        app: &str,
        options: Option<&Node>,
        callback: RequestCallback,
        context: OpaqueContext,
    ) -> i32;

    fn browse(&self, options: &Node, callback: RequestCallback, context: OpaqueContext) -> i32;

    /// Look up installed applications by bundle identifier.
    fn lookup(&self, app_ids: &[String], options: &Node) -> Result<Option<Node>, i32>;

    fn lookup_archives(&self, options: Option<&Node>) -> Result<Option<Node>, i32>;

    fn path_for_bundle_identifier(&self, bundle_id: &str) -> Result<Option<String>, i32>;
}
