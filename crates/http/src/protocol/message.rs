use bytes::{Buf, Bytes};

/// One frame produced by the response decoder.
///
/// A response arrives as a single `Header(head)` frame followed by zero or more
/// body chunks and exactly one [`PayloadItem::Eof`].
#[derive(Debug)]
pub enum Message<T, Data: Buf = Bytes> {
    /// A parsed head, for the client a [`ResponseHead`](crate::protocol::ResponseHead)
    Header(T),
    /// Body bytes or the end-of-body marker
    Payload(PayloadItem<Data>),
}

/// A body frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    Chunk(Data),
    /// No more body bytes belong to the current message
    Eof,
}

/// Body framing announced by a head.
///
/// Only `Content-Length` framing exists here: a zero or missing length is
/// [`PayloadSize::Empty`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    Length(u64),
    Empty,
}

impl PayloadSize {
    #[inline]
    pub fn new(length: u64) -> Self {
        match length {
            0 => PayloadSize::Empty,
            n => PayloadSize::Length(n),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Number of body bytes to expect
    #[inline]
    pub fn length(&self) -> u64 {
        match *self {
            PayloadSize::Length(n) => n,
            PayloadSize::Empty => 0,
        }
    }
}

impl<T> Message<T> {
    #[inline]
    pub fn is_header(&self) -> bool {
        matches!(self, Message::Header(_))
    }

    #[inline]
    pub fn is_payload(&self) -> bool {
        !self.is_header()
    }

    /// Body frame of this message, `None` for a head
    pub fn into_payload_item(self) -> Option<PayloadItem> {
        if let Message::Payload(item) = self { Some(item) } else { None }
    }
}

impl<D: Buf> PayloadItem<D> {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }
}

impl PayloadItem {
    /// Chunk bytes, `None` for [`PayloadItem::Eof`]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        if let PayloadItem::Chunk(bytes) = self { Some(bytes) } else { None }
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        if let PayloadItem::Chunk(bytes) = self { Some(bytes) } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_is_empty() {
        assert_eq!(PayloadSize::new(0), PayloadSize::Empty);
        assert_eq!(PayloadSize::new(7), PayloadSize::Length(7));
        assert!(PayloadSize::Empty.is_empty());
        assert_eq!(PayloadSize::Length(7).length(), 7);
    }

    #[test]
    fn frames_expose_their_payload() {
        let head: Message<()> = Message::Header(());
        assert!(head.is_header());
        assert!(head.into_payload_item().is_none());

        let chunk: Message<()> = Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"ab")));
        assert!(chunk.is_payload());
        let item = chunk.into_payload_item().unwrap();
        assert_eq!(item.as_bytes().map(|b| &b[..]), Some(&b"ab"[..]));
        assert_eq!(PayloadItem::<Bytes>::Eof.into_bytes(), None);
    }
}
