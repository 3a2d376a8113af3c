//! FlateDecode (zlib/deflate) as cooperative producers
//!
//! Both codecs are explicit state machines over a stateful flate2
//! compressor so that chunk boundaries in the input never matter: a
//! deflate stream may be split anywhere and each `resume` hands whatever
//! the inflater produced for one upstream chunk.

use super::{drain, Chunks, PredictorParams, PredictorDecoder, Producer, State};
use crate::error::{Error, Result};
use bytes::Bytes;
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

const OUTPUT_STEP: usize = 16 * 1024;

/// Streaming Flate decoder
pub struct FlateDecoder {
    upstream: Box<dyn Producer>,
    inflater: Decompress,
    state: State,
}

impl std::fmt::Debug for FlateDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlateDecoder")
            .field("upstream", &self.upstream)
            .field("state", &self.state)
            .finish()
    }
}

impl FlateDecoder {
    pub fn new(upstream: Box<dyn Producer>) -> Self {
        Self {
            upstream,
            inflater: Decompress::new(true),
            state: State::Fresh,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn fail(&mut self, cause: impl std::fmt::Display) -> Error {
        self.state = State::Errored;
        Error::filter(
            "FlateDecode",
            format!("Problem while decoding Flate encoded stream: {}", cause),
        )
    }

    /// Inflate one upstream chunk. Returns the produced bytes and whether
    /// the deflate stream ended inside this chunk.
    fn inflate_chunk(&mut self, input: &[u8]) -> Result<(Vec<u8>, bool)> {
        let mut out = Vec::new();
        let mut offset = 0;
        while offset < input.len() {
            if out.capacity() == out.len() {
                out.reserve(OUTPUT_STEP);
            }
            let before_in = self.inflater.total_in();
            let before_out = self.inflater.total_out();
            let status = self
                .inflater
                .decompress_vec(&input[offset..], &mut out, FlushDecompress::None)
                .map_err(|e| self.fail(e))?;
            offset += (self.inflater.total_in() - before_in) as usize;
            match status {
                Status::StreamEnd => return Ok((out, true)),
                Status::Ok | Status::BufError => {
                    let stuck = self.inflater.total_in() == before_in
                        && self.inflater.total_out() == before_out;
                    if stuck {
                        return Err(self.fail("no progress while inflating"));
                    }
                }
            }
        }
        Ok((out, false))
    }

    /// Flush the inflater's tail once the upstream is exhausted
    fn finish(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            if out.capacity() == out.len() {
                out.reserve(OUTPUT_STEP);
            }
            let before_out = self.inflater.total_out();
            let status = self
                .inflater
                .decompress_vec(&[], &mut out, FlushDecompress::Finish)
                .map_err(|e| self.fail(e))?;
            match status {
                Status::StreamEnd => return Ok(out),
                Status::Ok | Status::BufError => {
                    if self.inflater.total_out() == before_out {
                        return Err(self.fail("incomplete deflate stream"));
                    }
                }
            }
        }
    }
}

impl Producer for FlateDecoder {
    fn resume(&mut self) -> Result<Option<Bytes>> {
        match self.state {
            State::Finished => return Ok(None),
            State::Errored => {
                return Err(Error::filter(
                    "FlateDecode",
                    "Problem while decoding Flate encoded stream: producer already failed",
                ))
            }
            State::Fresh | State::Streaming => self.state = State::Streaming,
        }

        loop {
            let chunk = match self.upstream.resume() {
                Ok(chunk) => chunk,
                Err(err) => {
                    self.state = State::Errored;
                    return Err(err);
                }
            };
            match chunk {
                Some(data) => {
                    let (out, ended) = self.inflate_chunk(&data)?;
                    if ended {
                        // Trailing upstream bytes past the deflate stream
                        // are ignored
                        self.state = State::Finished;
                        return Ok(if out.is_empty() { None } else { Some(out.into()) });
                    }
                    if !out.is_empty() {
                        return Ok(Some(out.into()));
                    }
                }
                None => {
                    let out = self.finish()?;
                    self.state = State::Finished;
                    return Ok(if out.is_empty() { None } else { Some(out.into()) });
                }
            }
        }
    }

    fn alive(&self) -> bool {
        !matches!(self.state, State::Finished | State::Errored)
    }
}

/// Streaming Flate encoder
pub struct FlateEncoder {
    upstream: Box<dyn Producer>,
    deflater: Compress,
    state: State,
}

impl std::fmt::Debug for FlateEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlateEncoder")
            .field("upstream", &self.upstream)
            .field("state", &self.state)
            .finish()
    }
}

impl FlateEncoder {
    /// `level` is the compression level, 0-9
    pub fn new(upstream: Box<dyn Producer>, level: u32) -> Self {
        Self {
            upstream,
            deflater: Compress::new(Compression::new(level.min(9)), true),
            state: State::Fresh,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn fail(&mut self, cause: impl std::fmt::Display) -> Error {
        self.state = State::Errored;
        Error::filter(
            "FlateDecode",
            format!("Problem while encoding Flate stream: {}", cause),
        )
    }

    fn deflate_chunk(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut offset = 0;
        while offset < input.len() {
            if out.capacity() == out.len() {
                out.reserve(OUTPUT_STEP);
            }
            let before_in = self.deflater.total_in();
            self.deflater
                .compress_vec(&input[offset..], &mut out, FlushCompress::None)
                .map_err(|e| self.fail(e))?;
            let consumed = (self.deflater.total_in() - before_in) as usize;
            if consumed == 0 && out.capacity() > out.len() {
                return Err(self.fail("no progress while deflating"));
            }
            offset += consumed;
        }
        Ok(out)
    }

    fn finish(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            if out.capacity() == out.len() {
                out.reserve(OUTPUT_STEP);
            }
            let status = self
                .deflater
                .compress_vec(&[], &mut out, FlushCompress::Finish)
                .map_err(|e| self.fail(e))?;
            if status == Status::StreamEnd {
                return Ok(out);
            }
        }
    }
}

impl Producer for FlateEncoder {
    fn resume(&mut self) -> Result<Option<Bytes>> {
        match self.state {
            State::Finished => return Ok(None),
            State::Errored => {
                return Err(Error::filter(
                    "FlateDecode",
                    "Problem while encoding Flate stream: producer already failed",
                ))
            }
            State::Fresh | State::Streaming => self.state = State::Streaming,
        }

        loop {
            let chunk = match self.upstream.resume() {
                Ok(chunk) => chunk,
                Err(err) => {
                    self.state = State::Errored;
                    return Err(err);
                }
            };
            match chunk {
                Some(data) => {
                    let out = self.deflate_chunk(&data)?;
                    if !out.is_empty() {
                        return Ok(Some(out.into()));
                    }
                }
                None => {
                    let out = self.finish()?;
                    self.state = State::Finished;
                    return Ok(if out.is_empty() { None } else { Some(out.into()) });
                }
            }
        }
    }

    fn alive(&self) -> bool {
        !matches!(self.state, State::Finished | State::Errored)
    }
}

/// Decode FlateDecode-compressed data in one call, applying the predictor
/// when one is configured
pub fn decode_flate(data: &[u8], params: Option<&PredictorParams>) -> Result<Vec<u8>> {
    let source = Chunks::new(Bytes::copy_from_slice(data), OUTPUT_STEP);
    let mut producer: Box<dyn Producer> = Box::new(FlateDecoder::new(Box::new(source)));
    if let Some(params) = params {
        if params.predictor > 1 {
            producer = Box::new(PredictorDecoder::new(producer, params.clone()));
        }
    }
    drain(producer.as_mut())
}

/// Encode data with FlateDecode in one call
pub fn encode_flate(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let source = Chunks::new(Bytes::copy_from_slice(data), OUTPUT_STEP);
    let mut encoder = FlateEncoder::new(Box::new(source), level);
    drain(&mut encoder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flate_encode_decode() {
        // Use longer text with repetition for better compression
        let original = b"Hello, FlateDecode! This is a test of zlib compression. \
                         Hello, FlateDecode! This is a test of zlib compression. \
                         Hello, FlateDecode! This is a test of zlib compression.";

        let compressed = encode_flate(original, 6).unwrap();
        assert!(compressed.len() < original.len());

        let decompressed = decode_flate(&compressed, None).unwrap();
        assert_eq!(decompressed, original.as_slice());
    }

    #[test]
    fn test_flate_empty_data() {
        let empty: &[u8] = &[];
        let compressed = encode_flate(empty, 6).unwrap();
        let decompressed = decode_flate(&compressed, None).unwrap();
        assert_eq!(decompressed, empty);
    }

    #[test]
    fn test_flate_compression_levels() {
        let data = b"Test data for compression level testing";
        for level in [0, 3, 6, 9] {
            let compressed = encode_flate(data, level).unwrap();
            let decompressed = decode_flate(&compressed, None).unwrap();
            assert_eq!(decompressed, data);
        }
    }

    #[test]
    fn test_decoder_handles_arbitrary_chunk_boundaries() {
        let payload = b"Hello, world!";
        let compressed = encode_flate(payload, 6).unwrap();

        // Split the compressed stream at every possible boundary
        for split in 0..=compressed.len() {
            let source = Chunks::from_parts([
                Bytes::copy_from_slice(&compressed[..split]),
                Bytes::copy_from_slice(&compressed[split..]),
            ]);
            let mut decoder = FlateDecoder::new(Box::new(source));
            let mut out = Vec::new();
            while let Some(chunk) = decoder.resume().unwrap() {
                out.extend_from_slice(&chunk);
            }
            assert_eq!(out, payload, "failed at split {}", split);
        }
    }

    #[test]
    fn test_decoder_state_transitions() {
        let compressed = encode_flate(b"x", 6).unwrap();
        let source = Chunks::new(Bytes::from(compressed), 4);
        let mut decoder = FlateDecoder::new(Box::new(source));
        assert_eq!(decoder.state(), State::Fresh);
        assert!(decoder.alive());

        let mut out = Vec::new();
        while let Some(chunk) = decoder.resume().unwrap() {
            out.extend_from_slice(&chunk);
        }
        assert_eq!(out, b"x");
        assert_eq!(decoder.state(), State::Finished);
        assert!(!decoder.alive());
        // Finished producers stay exhausted
        assert_eq!(decoder.resume().unwrap(), None);
    }

    #[test]
    fn test_decoder_error_is_permanent() {
        let source = Chunks::from_parts([Bytes::from_static(b"definitely not zlib data")]);
        let mut decoder = FlateDecoder::new(Box::new(source));

        let err = decoder.resume().unwrap_err();
        assert!(format!("{}", err).contains("Problem while decoding Flate encoded stream"));
        assert_eq!(decoder.state(), State::Errored);
        assert!(!decoder.alive());

        // Subsequent resumes keep failing
        assert!(decoder.resume().is_err());
    }

    #[test]
    fn test_decoder_truncated_stream() {
        let compressed = encode_flate(b"some payload worth compressing", 6).unwrap();
        let truncated = &compressed[..compressed.len() / 2];
        let source = Chunks::new(Bytes::copy_from_slice(truncated), 8);
        let mut decoder = FlateDecoder::new(Box::new(source));

        let mut result = Ok(Some(Bytes::new()));
        while let Ok(Some(_)) = result {
            result = decoder.resume();
        }
        assert!(result.is_err());
        assert_eq!(decoder.state(), State::Errored);
    }

    #[test]
    fn test_encoder_streams_chunks() {
        let payload = b"chunked encoding test data, repeated: chunked encoding test data";
        let source = Chunks::new(Bytes::copy_from_slice(payload), 7);
        let mut encoder = FlateEncoder::new(Box::new(source), 6);

        let mut compressed = Vec::new();
        while let Some(chunk) = encoder.resume().unwrap() {
            compressed.extend_from_slice(&chunk);
        }
        assert_eq!(encoder.state(), State::Finished);
        assert_eq!(decode_flate(&compressed, None).unwrap(), payload);
    }

    #[test]
    fn test_round_trip_binary_data() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let compressed = encode_flate(&data, 9).unwrap();
        assert_eq!(decode_flate(&compressed, None).unwrap(), data);
    }
}
