//! LSM6DSL IMU Driver
//!
//! Driver for the ST LSM6DSL, a 6-axis inertial module combining a 3-axis
//! accelerometer and a 3-axis gyroscope behind a single I2C interface.
//!
//! # Features
//!
//! - 16-bit resolution per axis
//! - Accelerometer ranges: +/-2, 4, 8, 16 g
//! - Gyroscope ranges: +/-250, 500, 1000, 2000 dps
//! - Output data rates: 12.5 to 208 Hz (as configured here)
//! - Status-gated reads: a poll with no fresh data yields a zero vector
//!
//! # Example
//!
//! ```ignore
//! let mut imu = Lsm6dsl::new(i2c);
//! imu.init(&mut delay)?;
//!
//! loop {
//!     let sample = imu.read_sample()?;
//!     // Feed sample into the motion pipeline...
//! }
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use pdstate_core::error::Lsm6dslError;
use pdstate_core::types::{MotionSample, Vec3};
use pdstate_core::MotionSource;

/// LSM6DSL register addresses
#[allow(dead_code)]
mod regs {
    pub const FUNC_CFG_ACCESS: u8 = 0x01;
    pub const INT1_CTRL: u8 = 0x0D;
    pub const INT2_CTRL: u8 = 0x0E;
    pub const WHO_AM_I: u8 = 0x0F;
    pub const CTRL1_XL: u8 = 0x10;
    pub const CTRL2_G: u8 = 0x11;
    pub const CTRL3_C: u8 = 0x12;
    pub const CTRL4_C: u8 = 0x13;
    pub const CTRL5_C: u8 = 0x14;
    pub const CTRL6_C: u8 = 0x15;
    pub const CTRL7_G: u8 = 0x16;
    pub const CTRL8_XL: u8 = 0x17;
    pub const CTRL9_XL: u8 = 0x18;
    pub const CTRL10_C: u8 = 0x19;
    pub const STATUS_REG: u8 = 0x1E;
    pub const OUT_TEMP_L: u8 = 0x20;
    pub const OUT_TEMP_H: u8 = 0x21;
    pub const OUTX_L_G: u8 = 0x22;
    pub const OUTX_H_G: u8 = 0x23;
    pub const OUTY_L_G: u8 = 0x24;
    pub const OUTY_H_G: u8 = 0x25;
    pub const OUTZ_L_G: u8 = 0x26;
    pub const OUTZ_H_G: u8 = 0x27;
    pub const OUTX_L_XL: u8 = 0x28;
    pub const OUTX_H_XL: u8 = 0x29;
    pub const OUTY_L_XL: u8 = 0x2A;
    pub const OUTY_H_XL: u8 = 0x2B;
    pub const OUTZ_L_XL: u8 = 0x2C;
    pub const OUTZ_H_XL: u8 = 0x2D;
}

/// CTRL3_C values used during initialization
mod ctrl3 {
    /// Software reset, self-clearing
    pub const SW_RESET: u8 = 0x01;
    /// Block data update enabled; output register pairs latch until read
    pub const CONFIG: u8 = 0x48;
}

/// STATUS_REG data-available bits
mod status {
    /// Accelerometer has a fresh sample
    pub const XLDA: u8 = 0x01;
    /// Gyroscope has a fresh sample
    pub const GDA: u8 = 0x02;
}

/// I2C address with SA0 tied low (the wrist unit layout)
pub const I2C_ADDR: u8 = 0x6A;

/// I2C address with SA0 tied high
pub const I2C_ADDR_ALT: u8 = 0x6B;

/// Expected WHO_AM_I value
pub const CHIP_ID: u8 = 0x6A;

/// Output data rate configuration (ODR bits of CTRL1_XL / CTRL2_G)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputDataRate {
    /// 12.5 Hz
    Hz12_5 = 0x10,
    /// 26 Hz
    Hz26 = 0x20,
    /// 52 Hz (default for motion analysis)
    Hz52 = 0x30,
    /// 104 Hz
    Hz104 = 0x40,
    /// 208 Hz
    Hz208 = 0x50,
}

impl OutputDataRate {
    /// Get the data rate in Hz
    #[must_use]
    pub const fn hz(self) -> f32 {
        match self {
            Self::Hz12_5 => 12.5,
            Self::Hz26 => 26.0,
            Self::Hz52 => 52.0,
            Self::Hz104 => 104.0,
            Self::Hz208 => 208.0,
        }
    }
}

/// Accelerometer full-scale range (FS_XL bits of CTRL1_XL)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AccelScale {
    /// +/-2 g (default)
    G2 = 0x00,
    /// +/-16 g
    G16 = 0x04,
    /// +/-4 g
    G4 = 0x08,
    /// +/-8 g
    G8 = 0x0C,
}

impl AccelScale {
    /// Sensitivity in g per LSB
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::G2 => 0.000_061,
            Self::G4 => 0.000_122,
            Self::G8 => 0.000_244,
            Self::G16 => 0.000_488,
        }
    }
}

/// Gyroscope full-scale range (FS_G bits of CTRL2_G)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum GyroScale {
    /// +/-250 dps (default)
    Dps250 = 0x00,
    /// +/-500 dps
    Dps500 = 0x04,
    /// +/-1000 dps
    Dps1000 = 0x08,
    /// +/-2000 dps
    Dps2000 = 0x0C,
}

impl GyroScale {
    /// Sensitivity in degrees/second per LSB
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Dps250 => 0.008_75,
            Self::Dps500 => 0.017_5,
            Self::Dps1000 => 0.035,
            Self::Dps2000 => 0.07,
        }
    }
}

/// LSM6DSL driver
pub struct Lsm6dsl<I2C> {
    i2c: I2C,
    address: u8,
    odr: OutputDataRate,
    accel_scale: AccelScale,
    gyro_scale: GyroScale,
}

impl<I2C, E> Lsm6dsl<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Create a new LSM6DSL driver at the default address (SA0 low)
    #[must_use]
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, I2C_ADDR)
    }

    /// Create a new LSM6DSL driver at an explicit I2C address
    #[must_use]
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            odr: OutputDataRate::Hz52,
            accel_scale: AccelScale::G2,
            gyro_scale: GyroScale::Dps250,
        }
    }

    /// Set the output data rate (takes effect on the next `init`)
    pub fn set_output_data_rate(&mut self, odr: OutputDataRate) {
        self.odr = odr;
    }

    /// Set the accelerometer full-scale range (takes effect on the next `init`)
    pub fn set_accel_scale(&mut self, scale: AccelScale) {
        self.accel_scale = scale;
    }

    /// Set the gyroscope full-scale range (takes effect on the next `init`)
    pub fn set_gyro_scale(&mut self, scale: GyroScale) {
        self.gyro_scale = scale;
    }

    /// Get the configured output data rate
    #[must_use]
    pub fn output_data_rate(&self) -> OutputDataRate {
        self.odr
    }

    /// Initialize the LSM6DSL
    ///
    /// Verifies the chip identity, performs a software reset, and brings
    /// both sensors up at the configured rate and ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Lsm6dslError::BadChipId`] when WHO_AM_I disagrees with
    /// [`CHIP_ID`], or [`Lsm6dslError::Bus`] on an I2C failure.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), Lsm6dslError<E>> {
        // Identity check before touching any control register
        let id = self.read_register(regs::WHO_AM_I)?;
        if id != CHIP_ID {
            return Err(Lsm6dslError::BadChipId { got: id });
        }

        // Software reset, then wait for the register bank to reload
        self.write_register(regs::CTRL3_C, ctrl3::SW_RESET)?;
        delay.delay_ms(10);

        self.write_register(regs::CTRL3_C, ctrl3::CONFIG)?;
        self.write_register(regs::CTRL1_XL, self.odr as u8 | self.accel_scale as u8)?;
        self.write_register(regs::CTRL2_G, self.odr as u8 | self.gyro_scale as u8)?;

        // First samples are valid one ODR period after power-on
        delay.delay_ms(20);

        Ok(())
    }

    /// Read the accelerometer in g
    ///
    /// Returns [`Vec3::ZERO`] when the accelerometer has not produced a
    /// fresh sample since the last read.
    ///
    /// # Errors
    ///
    /// Returns [`Lsm6dslError::Bus`] on an I2C failure.
    pub fn read_accel(&mut self) -> Result<Vec3, Lsm6dslError<E>> {
        let flags = self.read_register(regs::STATUS_REG)?;
        if flags & status::XLDA == 0 {
            return Ok(Vec3::ZERO);
        }
        let raw = self.read_output(regs::OUTX_L_XL)?;
        Ok(scale_axes(&raw, self.accel_scale.sensitivity()))
    }

    /// Read the gyroscope in degrees/second
    ///
    /// Returns [`Vec3::ZERO`] when the gyroscope has not produced a fresh
    /// sample since the last read.
    ///
    /// # Errors
    ///
    /// Returns [`Lsm6dslError::Bus`] on an I2C failure.
    pub fn read_gyro(&mut self) -> Result<Vec3, Lsm6dslError<E>> {
        let flags = self.read_register(regs::STATUS_REG)?;
        if flags & status::GDA == 0 {
            return Ok(Vec3::ZERO);
        }
        let raw = self.read_output(regs::OUTX_L_G)?;
        Ok(scale_axes(&raw, self.gyro_scale.sensitivity()))
    }

    /// Release the I2C bus
    #[must_use]
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, addr: u8) -> Result<u8, Lsm6dslError<E>> {
        let mut buffer = [0u8; 1];
        self.i2c
            .write_read(self.address, &[addr], &mut buffer)
            .map_err(Lsm6dslError::Bus)?;
        Ok(buffer[0])
    }

    fn write_register(&mut self, addr: u8, value: u8) -> Result<(), Lsm6dslError<E>> {
        self.i2c
            .write(self.address, &[addr, value])
            .map_err(Lsm6dslError::Bus)
    }

    /// Burst-read one sensor's six output bytes starting at `addr`
    fn read_output(&mut self, addr: u8) -> Result<[u8; 6], Lsm6dslError<E>> {
        let mut buffer = [0u8; 6];
        self.i2c
            .write_read(self.address, &[addr], &mut buffer)
            .map_err(Lsm6dslError::Bus)?;
        Ok(buffer)
    }
}

impl<I2C, E> MotionSource for Lsm6dsl<I2C>
where
    I2C: I2c<Error = E>,
{
    type Error = Lsm6dslError<E>;

    fn read_sample(&mut self) -> Result<MotionSample, Self::Error> {
        Ok(MotionSample::new(self.read_accel()?, self.read_gyro()?))
    }
}

/// Assemble three little-endian i16 axis words and apply the scale factor
fn scale_axes(data: &[u8; 6], sensitivity: f32) -> Vec3 {
    let x = i16::from_le_bytes([data[0], data[1]]);
    let y = i16::from_le_bytes([data[2], data[3]]);
    let z = i16::from_le_bytes([data[4], data[5]]);
    Vec3::new(
        f32::from(x) * sensitivity,
        f32::from(y) * sensitivity,
        f32::from(z) * sensitivity,
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct FakeBusError;

    impl embedded_hal::i2c::Error for FakeBusError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Register-map fake with an auto-incrementing address pointer, the
    /// same access model the real part presents over I2C.
    struct FakeBus {
        registers: [u8; 0x30],
        pointer: u8,
        writes: heapless::Vec<(u8, u8), 16>,
        fail: bool,
    }

    impl FakeBus {
        fn new() -> Self {
            let mut registers = [0u8; 0x30];
            registers[regs::WHO_AM_I as usize] = CHIP_ID;
            Self { registers, pointer: 0, writes: heapless::Vec::new(), fail: false }
        }

        fn set(&mut self, addr: u8, value: u8) {
            self.registers[addr as usize] = value;
        }

        fn set_output(&mut self, addr: u8, x: i16, y: i16, z: i16) {
            let mut offset = addr as usize;
            for word in [x, y, z] {
                let bytes = word.to_le_bytes();
                self.registers[offset] = bytes[0];
                self.registers[offset + 1] = bytes[1];
                offset += 2;
            }
        }
    }

    impl ErrorType for FakeBus {
        type Error = FakeBusError;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err(FakeBusError);
            }
            assert_eq!(address, I2C_ADDR);
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        self.pointer = bytes[0];
                        for (offset, &value) in bytes[1..].iter().enumerate() {
                            let addr = self.pointer + offset as u8;
                            self.registers[addr as usize] = value;
                            let _ = self.writes.push((addr, value));
                        }
                    }
                    Operation::Read(buffer) => {
                        for (offset, slot) in buffer.iter_mut().enumerate() {
                            *slot = self.registers[self.pointer as usize + offset];
                        }
                    }
                }
            }
            Ok(())
        }
    }

    struct NoopDelay;

    impl DelayNs for NoopDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn test_init_configures_sensor() {
        let mut imu = Lsm6dsl::new(FakeBus::new());
        imu.init(&mut NoopDelay).unwrap();

        let bus = imu.release();
        // Reset first, then block-data-update, then both sensors at 52 Hz
        assert_eq!(
            bus.writes.as_slice(),
            &[
                (regs::CTRL3_C, ctrl3::SW_RESET),
                (regs::CTRL3_C, ctrl3::CONFIG),
                (regs::CTRL1_XL, 0x30),
                (regs::CTRL2_G, 0x30),
            ]
        );
    }

    #[test]
    fn test_init_rejects_wrong_chip() {
        let mut bus = FakeBus::new();
        bus.set(regs::WHO_AM_I, 0x69);

        let mut imu = Lsm6dsl::new(bus);
        let err = imu.init(&mut NoopDelay).unwrap_err();
        assert_eq!(err, Lsm6dslError::BadChipId { got: 0x69 });

        // Nothing was configured after the failed identity check
        assert!(imu.release().writes.is_empty());
    }

    #[test]
    fn test_read_skips_stale_data() {
        let mut bus = FakeBus::new();
        bus.set(regs::STATUS_REG, 0x00);
        bus.set_output(regs::OUTX_L_XL, 1000, 2000, 3000);

        let mut imu = Lsm6dsl::new(bus);
        assert_eq!(imu.read_accel().unwrap(), Vec3::ZERO);
        assert_eq!(imu.read_gyro().unwrap(), Vec3::ZERO);
    }

    #[test]
    fn test_accel_scaling() {
        let mut bus = FakeBus::new();
        bus.set(regs::STATUS_REG, status::XLDA);
        // 16393 LSB at 0.000061 g/LSB is within a millig of 1 g
        bus.set_output(regs::OUTX_L_XL, 16393, -16393, 0);

        let mut imu = Lsm6dsl::new(bus);
        let accel = imu.read_accel().unwrap();
        assert!((accel.x - 1.0).abs() < 1e-3);
        assert!((accel.y + 1.0).abs() < 1e-3);
        assert_eq!(accel.z, 0.0);
    }

    #[test]
    fn test_gyro_scaling() {
        let mut bus = FakeBus::new();
        bus.set(regs::STATUS_REG, status::GDA);
        bus.set_output(regs::OUTX_L_G, 1000, -2000, 400);

        let mut imu = Lsm6dsl::new(bus);
        let gyro = imu.read_gyro().unwrap();
        assert!((gyro.x - 8.75).abs() < 1e-4);
        assert!((gyro.y + 17.5).abs() < 1e-4);
        assert!((gyro.z - 3.5).abs() < 1e-4);
    }

    #[test]
    fn test_read_sample_combines_both_sensors() {
        let mut bus = FakeBus::new();
        bus.set(regs::STATUS_REG, status::XLDA | status::GDA);
        bus.set_output(regs::OUTX_L_XL, 16393, 0, 0);
        bus.set_output(regs::OUTX_L_G, 0, 1000, 0);

        let mut imu = Lsm6dsl::new(bus);
        let sample = MotionSource::read_sample(&mut imu).unwrap();
        assert!((sample.accel.x - 1.0).abs() < 1e-3);
        assert!((sample.gyro.y - 8.75).abs() < 1e-4);
    }

    #[test]
    fn test_bus_error_propagates() {
        let mut bus = FakeBus::new();
        bus.fail = true;

        let mut imu = Lsm6dsl::new(bus);
        assert!(matches!(imu.read_accel(), Err(Lsm6dslError::Bus(_))));
        assert!(matches!(imu.init(&mut NoopDelay), Err(Lsm6dslError::Bus(_))));
    }

    #[test]
    fn test_scale_axes_little_endian() {
        // 0x0102 = 258, 0xFFFF = -1, 0x7FFF = 32767
        let data = [0x02, 0x01, 0xFF, 0xFF, 0xFF, 0x7F];
        let v = scale_axes(&data, 1.0);
        assert_eq!(v.x, 258.0);
        assert_eq!(v.y, -1.0);
        assert_eq!(v.z, 32767.0);
    }

    #[test]
    fn test_scale_sensitivities() {
        assert!((AccelScale::G2.sensitivity() - 0.000_061).abs() < 1e-9);
        assert!((GyroScale::Dps250.sensitivity() - 0.008_75).abs() < 1e-9);
        assert!((OutputDataRate::Hz52.hz() - 52.0).abs() < f32::EPSILON);
    }
}
