use std::io::Read;

use url::Url;

use crate::properties::Properties;
use crate::Result;

/// Readable body of a download. Dropping it releases the underlying
/// connection or file.
pub type ByteStream = Box<dyn Read>;

/// A trait for fetching raw bytes from a remote location. Implementors can do
/// real HTTP calls or hand back canned streams for testing purposes.
pub trait Downloader {
    /// Open a stream for `url`. `Ok(None)` means the remote legitimately has no
    /// data for us, as opposed to an error while reaching it.
    fn open_stream(&self, url: &Url) -> Result<Option<ByteStream>>;
}

/// Turns loaded properties into a structured model.
pub trait Parser {
    type Model;
    fn parse(&self, properties: &Properties) -> Result<Self::Model>;
}

impl<D: Downloader + ?Sized> Downloader for &D {
    fn open_stream(&self, url: &Url) -> Result<Option<ByteStream>> {
        (**self).open_stream(url)
    }
}

impl<P: Parser + ?Sized> Parser for &P {
    type Model = P::Model;

    fn parse(&self, properties: &Properties) -> Result<Self::Model> {
        (**self).parse(properties)
    }
}
