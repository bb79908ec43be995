//! Bus transactions and the transport they are executed against.
//!
//! A [`Transaction`] is an ordered list of [`BusOp`]s bracketed by exactly one start and one stop
//! condition.  It is built per exchange, handed to a [`Transport`] together with a deadline, and
//! dropped afterwards.  The transport owns pin assignment, clocking and the actual wire activity.

use crate::types::Error;

use heapless::Vec;

/// Upper bound on the bytes read back by one transaction
pub const MAX_READ_LEN: usize = 8;
/// Upper bound on the operations in one transaction: start, address, `MAX_READ_LEN` reads, stop
pub const MAX_OPS: usize = MAX_READ_LEN + 3;

/// Bytes returned by a read transaction
pub type ReadBuf = Vec<u8, MAX_READ_LEN>;

/// Errors reported by the transport collaborator
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportError {
    /// A parameter or transaction was rejected as malformed
    InvalidArgument,
    /// The transaction failed on the wire (missing acknowledge, bus error, ...)
    Fail,
    /// The peripheral is not in a state that allows the request
    InvalidState,
    /// The transaction did not complete before its deadline
    Timeout,
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidArgument => Error::InvalidArgument,
            TransportError::Fail => Error::BusFailure,
            TransportError::InvalidState => Error::InvalidState,
            TransportError::Timeout => Error::Timeout,
        }
    }
}

/// Operating mode of the bus peripheral
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BusMode {
    /// Controller (master) mode, required to talk to the sensor
    Master,
    /// Target (slave) mode
    Slave,
}

/// Physical bus parameters handed to [`Transport::configure`]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BusConfig {
    /// GPIO used for SDA
    pub sda_pin: u8,
    /// GPIO used for SCL
    pub scl_pin: u8,
    /// enable the internal pull-up on SDA
    pub sda_pullup: bool,
    /// enable the internal pull-up on SCL
    pub scl_pullup: bool,
    /// SCL frequency in Hz
    pub clock_hz: u32,
    /// peripheral mode
    pub mode: BusMode,
}
impl Default for BusConfig {
    fn default() -> Self {
        Self {
            sda_pin: 22,
            scl_pin: 23,
            sda_pullup: true,
            scl_pullup: true,
            clock_hz: 400_000,
            mode: BusMode::Master,
        }
    }
}

/// Transfer direction, encoded in the low bit of the address byte
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// controller writes to the target
    Write = 0,
    /// controller reads from the target
    Read = 1,
}
impl Direction {
    /// Build the address byte for a 7-bit `address`
    pub const fn address_byte(self, address: u8) -> u8 {
        address << 1 | self as u8
    }
}

/// What the controller answers after receiving a byte
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AckPolicy {
    /// acknowledge, more bytes will follow
    Ack,
    /// not-acknowledge, this is the last byte
    Nack,
}

/// One step of a transaction
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BusOp {
    /// start condition
    Start,
    /// send a byte, optionally requiring the target to acknowledge it
    WriteByte {
        /// byte to send
        byte: u8,
        /// fail the transaction if the target does not acknowledge
        expect_ack: bool,
    },
    /// receive a byte
    ReadByte {
        /// response after the byte
        ack: AckPolicy,
    },
    /// stop condition
    Stop,
}

/// Decoded shape of a well-formed transaction
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Frame {
    /// address byte with the write bit, followed by `payload` (possibly empty)
    Write {
        /// 7-bit target address
        address: u8,
        /// bytes after the address byte
        payload: Vec<u8, MAX_OPS>,
    },
    /// address byte with the read bit, followed by `len` received bytes
    Read {
        /// 7-bit target address
        address: u8,
        /// number of bytes received
        len: usize,
    },
}

/// An ordered sequence of bus operations executed atomically by a [`Transport`]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Transaction {
    ops: Vec<BusOp, MAX_OPS>,
}

impl Transaction {
    /// Begin an empty transaction
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    fn push(&mut self, op: BusOp) -> Result<&mut Self, TransportError> {
        self.ops.push(op).map_err(|_| TransportError::InvalidArgument)?;
        Ok(self)
    }

    /// Append a start condition
    pub fn start(&mut self) -> Result<&mut Self, TransportError> {
        self.push(BusOp::Start)
    }

    /// Append a byte to send
    pub fn write_byte(&mut self, byte: u8, expect_ack: bool) -> Result<&mut Self, TransportError> {
        self.push(BusOp::WriteByte { byte, expect_ack })
    }

    /// Append a byte to receive
    pub fn read_byte(&mut self, ack: AckPolicy) -> Result<&mut Self, TransportError> {
        self.push(BusOp::ReadByte { ack })
    }

    /// Append a stop condition
    pub fn stop(&mut self) -> Result<&mut Self, TransportError> {
        self.push(BusOp::Stop)
    }

    /// Address-only write, used to check whether a target acknowledges its address
    pub fn probe(address: u8) -> Result<Self, TransportError> {
        let mut tx = Self::new();
        tx.start()?.write_byte(Direction::Write.address_byte(address), true)?.stop()?;
        Ok(tx)
    }

    /// Write the concatenation of `parts` to `address`
    pub fn write(address: u8, parts: &[&[u8]]) -> Result<Self, TransportError> {
        let mut tx = Self::new();
        tx.start()?.write_byte(Direction::Write.address_byte(address), true)?;
        for byte in parts.iter().flat_map(|part| part.iter()) {
            tx.write_byte(*byte, true)?;
        }
        tx.stop()?;
        Ok(tx)
    }

    /// Read `len` bytes from `address`, acknowledging all but the last
    pub fn read(address: u8, len: usize) -> Result<Self, TransportError> {
        if len == 0 || len > MAX_READ_LEN {
            return Err(TransportError::InvalidArgument);
        }
        let mut tx = Self::new();
        tx.start()?.write_byte(Direction::Read.address_byte(address), true)?;
        for ii in 0..len {
            let ack = if ii + 1 == len { AckPolicy::Nack } else { AckPolicy::Ack };
            tx.read_byte(ack)?;
        }
        tx.stop()?;
        Ok(tx)
    }

    /// The operations in execution order
    pub fn ops(&self) -> &[BusOp] {
        &self.ops
    }

    /// Number of bytes this transaction reads
    pub fn read_len(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, BusOp::ReadByte { .. })).count()
    }

    /// Check the transaction is well formed and decode it into a [`Frame`].
    ///
    /// Well formed means: one start first, one stop last, an acknowledged address byte, then either
    /// only acknowledged writes (write direction) or at least one read with every read
    /// acknowledged except the last (read direction).  Writes that do not expect an acknowledge
    /// are rejected, so every transport aborts on a missing one.
    pub fn frame(&self) -> Result<Frame, TransportError> {
        let body = match self.ops.as_slice() {
            [BusOp::Start, body @ .., BusOp::Stop] => body,
            _ => return Err(TransportError::InvalidArgument),
        };
        let (address_byte, rest) = match body {
            [BusOp::WriteByte { byte, expect_ack: true }, rest @ ..] => (*byte, rest),
            _ => return Err(TransportError::InvalidArgument),
        };
        let address = address_byte >> 1;

        if address_byte & 1 == Direction::Write as u8 {
            let mut payload = Vec::new();
            for op in rest {
                match op {
                    BusOp::WriteByte { byte, expect_ack: true } => {
                        payload.push(*byte).map_err(|_| TransportError::InvalidArgument)?
                    }
                    _ => return Err(TransportError::InvalidArgument),
                }
            }
            Ok(Frame::Write { address, payload })
        } else {
            let len = rest.len();
            for (ii, op) in rest.iter().enumerate() {
                let expected = if ii + 1 == len { AckPolicy::Nack } else { AckPolicy::Ack };
                match op {
                    BusOp::ReadByte { ack } if *ack == expected => {}
                    _ => return Err(TransportError::InvalidArgument),
                }
            }
            if len == 0 || len > MAX_READ_LEN {
                return Err(TransportError::InvalidArgument);
            }
            Ok(Frame::Read { address, len })
        }
    }
}

/// Host-side bus collaborator.
///
/// Implementations execute each transaction in order, abort at the first failed write, and give
/// up once `timeout_ms` has elapsed for the transaction as a whole.  They never retry.
pub trait Transport {
    /// Apply physical bus parameters
    fn configure(&mut self, config: &BusConfig) -> Result<(), TransportError>;
    /// Install the bus driver on logical `port`
    fn install(&mut self, port: u8) -> Result<(), TransportError>;
    /// Execute `transaction`, returning the bytes it read
    fn execute(&mut self, transaction: &Transaction, timeout_ms: u32) -> Result<ReadBuf, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn configure(&mut self, config: &BusConfig) -> Result<(), TransportError> {
        T::configure(self, config)
    }

    fn install(&mut self, port: u8) -> Result<(), TransportError> {
        T::install(self, port)
    }

    fn execute(&mut self, transaction: &Transaction, timeout_ms: u32) -> Result<ReadBuf, TransportError> {
        T::execute(self, transaction, timeout_ms)
    }
}
