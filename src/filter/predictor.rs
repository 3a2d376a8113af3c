//! PNG and TIFF predictors for PDF filters
//!
//! Predictors transform rows of sample data so they compress better.
//! Decoding reverses the transform row by row; both directions run as
//! cooperative producers that buffer only the current partial row.

use super::{PredictorParams, Producer, State};
use crate::error::{Error, Result};
use bytes::Bytes;

/// Reverses the predictor transform of decoded stream data
#[derive(Debug)]
pub struct PredictorDecoder {
    upstream: Box<dyn Producer>,
    params: PredictorParams,
    buffer: Vec<u8>,
    prev_row: Vec<u8>,
    state: State,
}

impl PredictorDecoder {
    pub fn new(upstream: Box<dyn Producer>, params: PredictorParams) -> Self {
        let prev_row = vec![0u8; params.bytes_per_row()];
        Self {
            upstream,
            params,
            buffer: Vec::new(),
            prev_row,
            state: State::Fresh,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn fail(&mut self, cause: impl std::fmt::Display) -> Error {
        self.state = State::Errored;
        Error::filter("Predictor", cause.to_string())
    }

    /// The encoded size of one row: PNG rows carry a leading filter type
    /// byte
    fn row_size(&self) -> usize {
        if self.params.predictor >= 10 {
            self.params.bytes_per_row() + 1
        } else {
            self.params.bytes_per_row()
        }
    }

    /// Decode every complete row in the buffer; with `finale` a trailing
    /// partial row is zero-padded and decoded as well
    fn take_rows(&mut self, finale: bool) -> Result<Vec<u8>> {
        let row_size = self.row_size();
        let mut out = Vec::new();
        while self.buffer.len() >= row_size {
            let row: Vec<u8> = self.buffer.drain(..row_size).collect();
            self.decode_row(&row, &mut out)?;
        }
        if finale && !self.buffer.is_empty() {
            let mut row = std::mem::take(&mut self.buffer);
            row.resize(row_size, 0);
            self.decode_row(&row, &mut out)?;
        }
        Ok(out)
    }

    fn decode_row(&mut self, row: &[u8], out: &mut Vec<u8>) -> Result<()> {
        match self.params.predictor {
            2 => {
                let decoded = tiff_decode_row(row, self.params.bytes_per_pixel());
                out.extend_from_slice(&decoded);
            }
            10..=15 => {
                let bpp = self.params.bytes_per_pixel();
                let decoded = png_decode_row(row[0], &row[1..], &self.prev_row, bpp)
                    .map_err(|e| self.fail(e))?;
                self.prev_row.copy_from_slice(&decoded);
                out.extend_from_slice(&decoded);
            }
            other => return Err(self.fail(format!("Unsupported predictor: {}", other))),
        }
        Ok(())
    }
}

impl Producer for PredictorDecoder {
    fn resume(&mut self) -> Result<Option<Bytes>> {
        match self.state {
            State::Finished => return Ok(None),
            State::Errored => return Err(Error::filter("Predictor", "producer already failed")),
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
                    self.buffer.extend_from_slice(&data);
                    let out = self.take_rows(false)?;
                    if !out.is_empty() {
                        return Ok(Some(out.into()));
                    }
                }
                None => {
                    let out = self.take_rows(true)?;
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

/// Applies the predictor transform before compression
#[derive(Debug)]
pub struct PredictorEncoder {
    upstream: Box<dyn Producer>,
    params: PredictorParams,
    buffer: Vec<u8>,
    prev_row: Vec<u8>,
    state: State,
}

impl PredictorEncoder {
    pub fn new(upstream: Box<dyn Producer>, params: PredictorParams) -> Self {
        let prev_row = vec![0u8; params.bytes_per_row()];
        Self {
            upstream,
            params,
            buffer: Vec::new(),
            prev_row,
            state: State::Fresh,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    fn fail(&mut self, cause: impl std::fmt::Display) -> Error {
        self.state = State::Errored;
        Error::filter("Predictor", cause.to_string())
    }

    /// The PNG filter type applied per row for predictor values 10-15
    fn png_filter_type(&self) -> u8 {
        match self.params.predictor {
            11 => 1, // Sub
            12 => 2, // Up
            13 => 3, // Average
            14 | 15 => 4, // Paeth
            _ => 0, // None
        }
    }

    fn take_rows(&mut self, finale: bool) -> Result<Vec<u8>> {
        let row_size = self.params.bytes_per_row();
        let mut out = Vec::new();
        while self.buffer.len() >= row_size {
            let row: Vec<u8> = self.buffer.drain(..row_size).collect();
            self.encode_row(&row, &mut out)?;
        }
        if finale && !self.buffer.is_empty() {
            let mut row = std::mem::take(&mut self.buffer);
            row.resize(row_size, 0);
            self.encode_row(&row, &mut out)?;
        }
        Ok(out)
    }

    fn encode_row(&mut self, row: &[u8], out: &mut Vec<u8>) -> Result<()> {
        let bpp = self.params.bytes_per_pixel();
        match self.params.predictor {
            2 => out.extend_from_slice(&tiff_encode_row(row, bpp)),
            10..=15 => {
                let filter_type = self.png_filter_type();
                out.push(filter_type);
                out.extend_from_slice(&png_encode_row(filter_type, row, &self.prev_row, bpp));
                self.prev_row.copy_from_slice(row);
            }
            other => return Err(self.fail(format!("Unsupported predictor: {}", other))),
        }
        Ok(())
    }
}

impl Producer for PredictorEncoder {
    fn resume(&mut self) -> Result<Option<Bytes>> {
        match self.state {
            State::Finished => return Ok(None),
            State::Errored => return Err(Error::filter("Predictor", "producer already failed")),
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
                    self.buffer.extend_from_slice(&data);
                    let out = self.take_rows(false)?;
                    if !out.is_empty() {
                        return Ok(Some(out.into()));
                    }
                }
                None => {
                    let out = self.take_rows(true)?;
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

/// Reverse TIFF horizontal differencing for one row
fn tiff_decode_row(row: &[u8], bytes_per_pixel: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(row.len());
    for (i, &byte) in row.iter().enumerate() {
        let left = if i >= bytes_per_pixel {
            out[i - bytes_per_pixel]
        } else {
            0
        };
        out.push(byte.wrapping_add(left));
    }
    out
}

/// Apply TIFF horizontal differencing to one row
fn tiff_encode_row(row: &[u8], bytes_per_pixel: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(row.len());
    for (i, &byte) in row.iter().enumerate() {
        let left = if i >= bytes_per_pixel {
            row[i - bytes_per_pixel]
        } else {
            0
        };
        out.push(byte.wrapping_sub(left));
    }
    out
}

/// Reverse one PNG-filtered row
fn png_decode_row(
    filter_type: u8,
    row: &[u8],
    prev_row: &[u8],
    bytes_per_pixel: usize,
) -> std::result::Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(row.len());
    match filter_type {
        0 => out.extend_from_slice(row),
        1 => {
            // Sub
            for (i, &byte) in row.iter().enumerate() {
                let left = if i >= bytes_per_pixel {
                    out[i - bytes_per_pixel]
                } else {
                    0
                };
                out.push(byte.wrapping_add(left));
            }
        }
        2 => {
            // Up
            for (i, &byte) in row.iter().enumerate() {
                let up = prev_row.get(i).copied().unwrap_or(0);
                out.push(byte.wrapping_add(up));
            }
        }
        3 => {
            // Average
            for (i, &byte) in row.iter().enumerate() {
                let left = if i >= bytes_per_pixel {
                    out[i - bytes_per_pixel] as u32
                } else {
                    0
                };
                let up = prev_row.get(i).copied().unwrap_or(0) as u32;
                out.push(byte.wrapping_add(((left + up) / 2) as u8));
            }
        }
        4 => {
            // Paeth
            for (i, &byte) in row.iter().enumerate() {
                let left = if i >= bytes_per_pixel {
                    out[i - bytes_per_pixel]
                } else {
                    0
                };
                let up = prev_row.get(i).copied().unwrap_or(0);
                let up_left = if i >= bytes_per_pixel {
                    prev_row.get(i - bytes_per_pixel).copied().unwrap_or(0)
                } else {
                    0
                };
                out.push(byte.wrapping_add(paeth_predictor(left, up, up_left)));
            }
        }
        other => return Err(format!("Unknown PNG filter type: {}", other)),
    }
    Ok(out)
}

/// Apply one PNG filter to a raw row. Unlike decoding, the neighbors come
/// from the raw (unfiltered) data.
fn png_encode_row(filter_type: u8, row: &[u8], prev_row: &[u8], bytes_per_pixel: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(row.len());
    for (i, &byte) in row.iter().enumerate() {
        let left = if i >= bytes_per_pixel {
            row[i - bytes_per_pixel]
        } else {
            0
        };
        let up = prev_row.get(i).copied().unwrap_or(0);
        let up_left = if i >= bytes_per_pixel {
            prev_row.get(i - bytes_per_pixel).copied().unwrap_or(0)
        } else {
            0
        };
        let predicted = match filter_type {
            1 => left,
            2 => up,
            3 => (((left as u32) + (up as u32)) / 2) as u8,
            4 => paeth_predictor(left, up, up_left),
            _ => 0,
        };
        out.push(byte.wrapping_sub(predicted));
    }
    out
}

/// Paeth predictor function
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let a = a as i32;
    let b = b as i32;
    let c = c as i32;

    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();

    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}
