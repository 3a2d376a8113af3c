//! Stream filters
//!
//! Stream payloads are decoded and encoded through chains of cooperative
//! producers: each [`Producer::resume`] yields at most one chunk, a
//! downstream codec pulls from its upstream only when it needs more input,
//! and nothing is buffered beyond what the codec state requires. Codec
//! failures propagate out of the failing `resume` and leave the producer
//! errored for good.
//!
//! Only Flate (with the optional PNG/TIFF predictor) is implemented;
//! other filters are recognized by name and reported as unsupported.

pub mod flate;
pub mod params;
pub mod predictor;

pub use flate::{decode_flate, encode_flate, FlateDecoder, FlateEncoder};
pub use params::PredictorParams;
pub use predictor::{PredictorDecoder, PredictorEncoder};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::object::{Dict, Name, Object, Stream};
use bytes::Bytes;
use std::collections::VecDeque;

/// Codec state of a filter producer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Fresh,
    Streaming,
    Finished,
    Errored,
}

/// A cooperative chunk producer
pub trait Producer: std::fmt::Debug {
    /// Produce the next chunk, or `None` once exhausted. A failed
    /// producer keeps returning its error.
    fn resume(&mut self) -> Result<Option<Bytes>>;

    /// Whether another `resume` may yield data
    fn alive(&self) -> bool;
}

/// Source producer over in-memory data
///
/// Splitting [`Bytes`] is cheap, so chunking never copies the payload.
#[derive(Debug)]
pub struct Chunks {
    parts: VecDeque<Bytes>,
}

impl Chunks {
    /// Yield `data` in chunks of at most `chunk_size` bytes
    pub fn new(data: Bytes, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let mut parts = VecDeque::new();
        let mut pos = 0;
        while pos < data.len() {
            let end = (pos + chunk_size).min(data.len());
            parts.push_back(data.slice(pos..end));
            pos = end;
        }
        Self { parts }
    }

    /// Yield exactly the given chunks, one per `resume`
    pub fn from_parts(parts: impl IntoIterator<Item = Bytes>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
        }
    }
}

impl Producer for Chunks {
    fn resume(&mut self) -> Result<Option<Bytes>> {
        Ok(self.parts.pop_front())
    }

    fn alive(&self) -> bool {
        !self.parts.is_empty()
    }
}

/// Run a producer to completion and collect its output
pub fn drain(producer: &mut dyn Producer) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(chunk) = producer.resume()? {
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

/// The filter names of a stream dictionary (`/Filter` holds a single name
/// or an array of names)
pub fn filter_names(dict: &Dict) -> Result<Vec<Name>> {
    match dict.get("Filter") {
        None | Some(Object::Null) => Ok(vec![]),
        Some(Object::Name(name)) => Ok(vec![name.clone()]),
        Some(Object::Array(entries)) => entries
            .iter()
            .map(|entry| {
                entry
                    .as_name()
                    .cloned()
                    .ok_or_else(|| Error::generic("Entries of /Filter must be names"))
            })
            .collect(),
        Some(other) => Err(Error::generic(format!(
            "/Filter must be a name or an array of names, not {}",
            other.type_name()
        ))),
    }
}

/// The decode parameter dictionaries, parallel to the filter list
fn decode_parms(dict: &Dict) -> Vec<Option<&Dict>> {
    match dict.get("DecodeParms") {
        Some(Object::Dict(d)) => vec![Some(d)],
        Some(Object::Array(entries)) => entries.iter().map(Object::as_dict).collect(),
        _ => vec![],
    }
}

/// Chain the decoder for one filter onto `upstream`
fn decoder_for(
    name: &Name,
    parms: Option<&Dict>,
    upstream: Box<dyn Producer>,
) -> Result<Box<dyn Producer>> {
    match name.as_str() {
        "FlateDecode" | "Fl" => {
            let mut producer: Box<dyn Producer> = Box::new(FlateDecoder::new(upstream));
            let params = parms.map(PredictorParams::from_dict).unwrap_or_default();
            if params.predictor > 1 {
                producer = Box::new(PredictorDecoder::new(producer, params));
            }
            Ok(producer)
        }
        other => Err(Error::filter(other, "filter is not supported")),
    }
}

impl Stream {
    /// The raw payload as a chunk producer
    pub fn chunks(&self, chunk_size: usize) -> Chunks {
        Chunks::new(self.raw_data().clone(), chunk_size)
    }

    /// A producer yielding the decoded payload, with the stream's filter
    /// chain applied in order
    pub fn decode_producer(&self, config: &Config) -> Result<Box<dyn Producer>> {
        let names = filter_names(&self.dict)?;
        let parms = decode_parms(&self.dict);
        let mut producer: Box<dyn Producer> = Box::new(self.chunks(config.stream_chunk_size));
        for (index, name) in names.iter().enumerate() {
            producer = decoder_for(name, parms.get(index).copied().flatten(), producer)?;
        }
        Ok(producer)
    }

    /// The fully decoded payload (what a serializer or consumer reads)
    pub fn decoded_data(&self, config: &Config) -> Result<Vec<u8>> {
        drain(self.decode_producer(config)?.as_mut())
    }
}

/// A producer encoding `source` for storage: the predictor (when
/// configured) is applied first, then Flate compression at the configured
/// level
pub fn encode_producer(
    source: Box<dyn Producer>,
    params: Option<PredictorParams>,
    config: &Config,
) -> Box<dyn Producer> {
    let mut producer = source;
    if let Some(params) = params {
        if params.predictor > 1 {
            producer = Box::new(PredictorEncoder::new(producer, params));
        }
    }
    Box::new(FlateEncoder::new(producer, config.flate_compression))
}

/// Encode in-memory data for storage in a Flate stream
pub fn encode_data(data: &[u8], config: &Config) -> Result<Vec<u8>> {
    let source = Chunks::new(Bytes::copy_from_slice(data), config.stream_chunk_size);
    drain(encode_producer(Box::new(source), None, config).as_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::dict_from;

    #[test]
    fn test_chunks_respects_chunk_size() {
        let mut chunks = Chunks::new(Bytes::from_static(b"abcdefgh"), 3);
        assert!(chunks.alive());
        assert_eq!(chunks.resume().unwrap().unwrap().as_ref(), b"abc");
        assert_eq!(chunks.resume().unwrap().unwrap().as_ref(), b"def");
        assert_eq!(chunks.resume().unwrap().unwrap().as_ref(), b"gh");
        assert_eq!(chunks.resume().unwrap(), None);
        assert!(!chunks.alive());
    }

    #[test]
    fn test_chunks_from_parts() {
        let mut chunks = Chunks::from_parts([Bytes::from_static(b"one"), Bytes::from_static(b"two")]);
        assert_eq!(chunks.resume().unwrap().unwrap().as_ref(), b"one");
        assert_eq!(chunks.resume().unwrap().unwrap().as_ref(), b"two");
        assert_eq!(chunks.resume().unwrap(), None);
    }

    #[test]
    fn test_filter_names_single_and_array() {
        let dict = dict_from([("Filter", Object::Name(Name::new("FlateDecode")))]);
        assert_eq!(filter_names(&dict).unwrap(), vec![Name::new("FlateDecode")]);

        let dict = dict_from([(
            "Filter",
            Object::Array(vec![
                Object::Name(Name::new("ASCIIHexDecode")),
                Object::Name(Name::new("FlateDecode")),
            ]),
        )]);
        assert_eq!(filter_names(&dict).unwrap().len(), 2);

        assert!(filter_names(&Dict::new()).unwrap().is_empty());
    }

    #[test]
    fn test_filter_names_rejects_non_names() {
        let dict = dict_from([("Filter", Object::Int(5))]);
        assert!(filter_names(&dict).is_err());
    }

    #[test]
    fn test_unfiltered_stream_decodes_to_raw() {
        let config = Config::default();
        let stream = Stream::new(Dict::new(), Bytes::from_static(b"plain data"));
        assert_eq!(stream.decoded_data(&config).unwrap(), b"plain data");
    }

    #[test]
    fn test_unsupported_filter_errors() {
        let config = Config::default();
        let dict = dict_from([("Filter", Object::Name(Name::new("JPXDecode")))]);
        let stream = Stream::new(dict, Bytes::new());
        let err = stream.decode_producer(&config).unwrap_err();
        assert!(matches!(err, Error::Filter { .. }));
        assert!(format!("{}", err).contains("JPXDecode"));
    }

    #[test]
    fn test_stream_decode_round_trip() {
        let config = Config::default();
        let payload = b"stream payload that compresses nicely nicely nicely";
        let encoded = encode_data(payload, &config).unwrap();
        let dict = dict_from([
            ("Filter", Object::Name(Name::new("FlateDecode"))),
            ("Length", Object::Int(encoded.len() as i64)),
        ]);
        let stream = Stream::new(dict, encoded);
        assert_eq!(stream.decoded_data(&config).unwrap(), payload);
    }

    #[test]
    fn test_drain_collects_everything() {
        let mut chunks = Chunks::new(Bytes::from_static(b"abcdef"), 2);
        assert_eq!(drain(&mut chunks).unwrap(), b"abcdef");
    }
}
