#[cfg(test)]
pub mod utils {
    use crate::{
        error::UCError,
        io::{ByteStream, Downloader, Parser},
        logging::Logger,
        properties::Properties,
        proxy::{ProxyRoute, ProxySelector},
        time::{Clock, Milliseconds},
        Result,
    };
    use std::{
        cell::{Cell, RefCell},
        collections::VecDeque,
        io::{Cursor, Read},
        rc::Rc,
    };
    use url::Url;

    pub enum MockResponse {
        Body(String),
        NoData,
        Error(String),
        /// Stream that yields the body and then fails with the given cause.
        ReadError(String, String),
    }

    /// Answers the scripted responses in order, one per `open_stream` call.
    pub struct MockDownloader {
        responses: RefCell<VecDeque<MockResponse>>,
        pub open_count: RefCell<u32>,
        pub released_count: Rc<RefCell<u32>>,
        pub last_url: RefCell<String>,
    }

    impl MockDownloader {
        pub fn new(responses: Vec<MockResponse>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                open_count: RefCell::new(0),
                released_count: Rc::new(RefCell::new(0)),
                last_url: RefCell::new(String::new()),
            }
        }
    }

    /// Stream that records when it gets dropped.
    struct TrackedStream {
        body: Cursor<Vec<u8>>,
        read_error: Option<String>,
        released_count: Rc<RefCell<u32>>,
    }

    impl Read for TrackedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let read = self.body.read(buf)?;
            match &self.read_error {
                Some(cause) if read == 0 => Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    cause.clone(),
                )),
                _ => Ok(read),
            }
        }
    }

    impl Drop for TrackedStream {
        fn drop(&mut self) {
            *self.released_count.borrow_mut() += 1;
        }
    }

    impl Downloader for MockDownloader {
        fn open_stream(&self, url: &Url) -> Result<Option<ByteStream>> {
            *self.open_count.borrow_mut() += 1;
            self.last_url.replace(url.to_string());
            match self.responses.borrow_mut().pop_front() {
                Some(MockResponse::Body(body)) => Ok(Some(Box::new(TrackedStream {
                    body: Cursor::new(body.into_bytes()),
                    read_error: None,
                    released_count: self.released_count.clone(),
                }))),
                Some(MockResponse::ReadError(body, cause)) => {
                    Ok(Some(Box::new(TrackedStream {
                        body: Cursor::new(body.into_bytes()),
                        read_error: Some(cause),
                        released_count: self.released_count.clone(),
                    })))
                }
                Some(MockResponse::NoData) => Ok(None),
                Some(MockResponse::Error(msg)) => Err(UCError::TransportError(msg).into()),
                None => Err(UCError::TransportError("No more mock responses".to_string()).into()),
            }
        }
    }

    /// Model is the value of the `version` property.
    pub struct MockParser;

    impl Parser for MockParser {
        type Model = String;

        fn parse(&self, properties: &Properties) -> Result<String> {
            properties
                .get("version")
                .map(str::to_string)
                .ok_or_else(|| UCError::FormatError("missing version".to_string()).into())
        }
    }

    pub struct MockClock {
        now: Cell<u64>,
    }

    impl MockClock {
        pub fn new(now: u64) -> Self {
            Self {
                now: Cell::new(now),
            }
        }

        pub fn set(&self, now: u64) {
            self.now.set(now);
        }

        pub fn advance(&self, milliseconds: u64) {
            self.now.set(self.now.get() + milliseconds);
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Milliseconds {
            Milliseconds::new(self.now.get())
        }
    }

    #[derive(Default)]
    pub struct MockLogger {
        pub infos: RefCell<Vec<String>>,
        pub errors: RefCell<Vec<String>>,
    }

    impl Logger for MockLogger {
        fn info(&self, msg: &str) {
            self.infos.borrow_mut().push(msg.to_string());
        }

        fn error(&self, msg: &str) {
            self.errors.borrow_mut().push(msg.to_string());
        }
    }

    pub struct MockProxySelector {
        routes: Vec<ProxyRoute>,
        pub select_count: RefCell<u32>,
    }

    impl MockProxySelector {
        pub fn new(routes: Vec<ProxyRoute>) -> Self {
            Self {
                routes,
                select_count: RefCell::new(0),
            }
        }
    }

    impl ProxySelector for MockProxySelector {
        fn select(&self, _url: &Url) -> Vec<ProxyRoute> {
            *self.select_count.borrow_mut() += 1;
            self.routes.clone()
        }
    }
}
