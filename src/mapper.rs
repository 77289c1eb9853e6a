//! Pluggable remapping of file uris and source positions.
//!
//! Both capabilities are async and may suspend on external lookups such as
//! source map reads. Returning `None` means "no usable mapping": callers treat
//! it as a soft failure for that one point or file and never retry.

use std::future::Future;
use std::marker::PhantomData;

use futures::future::{self, BoxFuture, FutureExt};

use crate::model::{Position, Range, SourceLocation};

/// Translates a position in a compiled file to its original location.
pub trait LocationMapper: Send + Sync {
    fn map<'a>(&'a self, uri: &'a str, position: Position)
        -> BoxFuture<'a, Option<SourceLocation>>;
}

/// Translates a compiled file uri into the uri coverage is reported under.
pub trait FileUriMapper: Send + Sync {
    fn map<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Option<String>>;
}

/// Leaves uris and positions untouched. A mapped position becomes a
/// zero-length range in the file it came from.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl LocationMapper for IdentityMapper {
    fn map<'a>(
        &'a self,
        uri: &'a str,
        position: Position,
    ) -> BoxFuture<'a, Option<SourceLocation>> {
        future::ready(Some(SourceLocation::new(uri, Range::point(position)))).boxed()
    }
}

impl FileUriMapper for IdentityMapper {
    fn map<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Option<String>> {
        future::ready(Some(uri.to_string())).boxed()
    }
}

/// Adapts an async closure into a `LocationMapper`.
///
/// ```
/// use covremap::mapper::LocationFn;
/// use covremap::model::{Position, Range, SourceLocation};
///
/// let mapper = LocationFn::new(|uri: &str, pos: Position| {
///     let uri = uri.replace("/dist/", "/src/");
///     async move { Some(SourceLocation::new(uri, Range::point(pos))) }
/// });
/// # let _ = mapper;
/// ```
pub struct LocationFn<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

impl<F, Fut> LocationFn<F, Fut>
where
    F: Fn(&str, Position) -> Fut,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _fut: PhantomData,
        }
    }
}

impl<F, Fut> LocationMapper for LocationFn<F, Fut>
where
    F: Fn(&str, Position) -> Fut + Send + Sync,
    Fut: Future<Output = Option<SourceLocation>> + Send + 'static,
{
    fn map<'a>(
        &'a self,
        uri: &'a str,
        position: Position,
    ) -> BoxFuture<'a, Option<SourceLocation>> {
        (self.f)(uri, position).boxed()
    }
}

/// Adapts an async closure into a `FileUriMapper`.
pub struct FileUriFn<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FileUriFn<F, Fut>
where
    F: Fn(&str) -> Fut,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _fut: PhantomData,
        }
    }
}

impl<F, Fut> FileUriMapper for FileUriFn<F, Fut>
where
    F: Fn(&str) -> Fut + Send + Sync,
    Fut: Future<Output = Option<String>> + Send + 'static,
{
    fn map<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Option<String>> {
        (self.f)(uri).boxed()
    }
}

/// Rewrites a leading path prefix, e.g. a build directory onto the source
/// tree. Coordinates are left unchanged and uris outside the prefix pass
/// through.
#[derive(Debug, Clone)]
pub struct PrefixMapper {
    from: String,
    to: String,
}

impl PrefixMapper {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Parse a `FROM=TO` pair.
    pub fn parse(pair: &str) -> Option<Self> {
        let (from, to) = pair.split_once('=')?;
        if from.is_empty() {
            return None;
        }
        Some(Self::new(from, to))
    }

    pub fn rewrite(&self, uri: &str) -> String {
        match uri.strip_prefix(self.from.as_str()) {
            Some(rest) => format!("{}{}", self.to, rest),
            None => uri.to_string(),
        }
    }
}

impl LocationMapper for PrefixMapper {
    fn map<'a>(
        &'a self,
        uri: &'a str,
        position: Position,
    ) -> BoxFuture<'a, Option<SourceLocation>> {
        let location = SourceLocation::new(self.rewrite(uri), Range::point(position));
        future::ready(Some(location)).boxed()
    }
}

impl FileUriMapper for PrefixMapper {
    fn map<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Option<String>> {
        future::ready(Some(self.rewrite(uri))).boxed()
    }
}
