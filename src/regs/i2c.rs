// Licensed under the Apache-2.0 license

//! Inter-integrated circuit interface (I2C1..I2C3), RM0090 ch. 27.

use tock_registers::register_bitfields;
use tock_registers::registers::{ReadOnly, ReadWrite};

#[repr(C)]
pub struct RegisterBlock {
    /// control register 1
    pub cr1: ReadWrite<u32, CR1::Register>,
    /// control register 2
    pub cr2: ReadWrite<u32, CR2::Register>,
    /// own address register 1
    pub oar1: ReadWrite<u32, OAR1::Register>,
    /// own address register 2
    pub oar2: ReadWrite<u32, OAR2::Register>,
    /// data register
    pub dr: ReadWrite<u32>,
    /// status register 1
    pub sr1: ReadWrite<u32, SR1::Register>,
    /// status register 2
    pub sr2: ReadOnly<u32, SR2::Register>,
    /// clock control register
    pub ccr: ReadWrite<u32, CCR::Register>,
    /// rise time register
    pub trise: ReadWrite<u32, TRISE::Register>,
    /// noise filter register
    pub fltr: ReadWrite<u32, FLTR::Register>,
}

register_bitfields![u32,
    pub CR1 [
        /// Software reset
        SWRST OFFSET(15) NUMBITS(1) [],
        /// SMBus alert
        ALERT OFFSET(13) NUMBITS(1) [],
        /// Packet error checking transfer
        PEC OFFSET(12) NUMBITS(1) [],
        /// Acknowledge/PEC position (for data reception)
        POS OFFSET(11) NUMBITS(1) [],
        /// Acknowledge enable
        ACK OFFSET(10) NUMBITS(1) [],
        /// Stop generation
        STOP OFFSET(9) NUMBITS(1) [],
        /// Start generation
        START OFFSET(8) NUMBITS(1) [],
        /// Clock stretching disable (slave mode)
        NOSTRETCH OFFSET(7) NUMBITS(1) [],
        /// General call enable
        ENGC OFFSET(6) NUMBITS(1) [],
        /// PEC enable
        ENPEC OFFSET(5) NUMBITS(1) [],
        /// ARP enable
        ENARP OFFSET(4) NUMBITS(1) [],
        /// SMBus type
        SMBTYPE OFFSET(3) NUMBITS(1) [],
        /// SMBus mode
        SMBUS OFFSET(1) NUMBITS(1) [],
        /// Peripheral enable
        PE OFFSET(0) NUMBITS(1) []
    ],
    pub CR2 [
        /// DMA last transfer
        LAST OFFSET(12) NUMBITS(1) [],
        /// DMA requests enable
        DMAEN OFFSET(11) NUMBITS(1) [],
        /// Buffer interrupt enable (TXE/RXNE)
        ITBUFEN OFFSET(10) NUMBITS(1) [],
        /// Event interrupt enable
        ITEVTEN OFFSET(9) NUMBITS(1) [],
        /// Error interrupt enable
        ITERREN OFFSET(8) NUMBITS(1) [],
        /// Peripheral clock frequency, MHz
        FREQ OFFSET(0) NUMBITS(6) []
    ],
    pub OAR1 [
        /// Addressing mode (slave mode)
        ADDMODE OFFSET(15) NUMBITS(1) [
            SevenBit = 0,
            TenBit = 1
        ],
        /// Must be kept set by software
        BIT14 OFFSET(14) NUMBITS(1) [],
        /// Interface address, bits 9:8 in 10-bit mode
        ADD10 OFFSET(8) NUMBITS(2) [],
        /// Interface address, bits 7:1
        ADD OFFSET(1) NUMBITS(7) [],
        /// Interface address, bit 0 in 10-bit mode
        ADD0 OFFSET(0) NUMBITS(1) []
    ],
    pub OAR2 [
        /// Second interface address
        ADD2 OFFSET(1) NUMBITS(7) [],
        /// Dual addressing mode enable
        ENDUAL OFFSET(0) NUMBITS(1) []
    ],
    pub SR1 [
        /// SMBus alert
        SMBALERT OFFSET(15) NUMBITS(1) [],
        /// Timeout or Tlow error
        TIMEOUT OFFSET(14) NUMBITS(1) [],
        /// PEC error in reception
        PECERR OFFSET(12) NUMBITS(1) [],
        /// Overrun/underrun
        OVR OFFSET(11) NUMBITS(1) [],
        /// Acknowledge failure
        AF OFFSET(10) NUMBITS(1) [],
        /// Arbitration lost (master mode)
        ARLO OFFSET(9) NUMBITS(1) [],
        /// Bus error
        BERR OFFSET(8) NUMBITS(1) [],
        /// Data register empty (transmitters)
        TXE OFFSET(7) NUMBITS(1) [],
        /// Data register not empty (receivers)
        RXNE OFFSET(6) NUMBITS(1) [],
        /// Stop detection (slave mode)
        STOPF OFFSET(4) NUMBITS(1) [],
        /// 10-bit header sent (master mode)
        ADD10 OFFSET(3) NUMBITS(1) [],
        /// Byte transfer finished
        BTF OFFSET(2) NUMBITS(1) [],
        /// Address sent (master) / matched (slave)
        ADDR OFFSET(1) NUMBITS(1) [],
        /// Start bit (master mode)
        SB OFFSET(0) NUMBITS(1) []
    ],
    pub SR2 [
        /// Packet error checking register
        PEC OFFSET(8) NUMBITS(8) [],
        /// Dual flag (slave mode)
        DUALF OFFSET(7) NUMBITS(1) [],
        /// SMBus host header (slave mode)
        SMBHOST OFFSET(6) NUMBITS(1) [],
        /// SMBus device default address (slave mode)
        SMBDEFAULT OFFSET(5) NUMBITS(1) [],
        /// General call address (slave mode)
        GENCALL OFFSET(4) NUMBITS(1) [],
        /// Transmitter/receiver
        TRA OFFSET(2) NUMBITS(1) [],
        /// Bus busy
        BUSY OFFSET(1) NUMBITS(1) [],
        /// Master/slave
        MSL OFFSET(0) NUMBITS(1) []
    ],
    pub CCR [
        /// Master mode selection
        FS OFFSET(15) NUMBITS(1) [
            Standard = 0,
            Fast = 1
        ],
        /// Fast mode duty cycle
        DUTY OFFSET(14) NUMBITS(1) [],
        /// Clock control in master mode
        CCR OFFSET(0) NUMBITS(12) []
    ],
    pub TRISE [
        /// Maximum rise time in master mode
        TRISE OFFSET(0) NUMBITS(6) []
    ],
    pub FLTR [
        /// Analog noise filter off
        ANOFF OFFSET(4) NUMBITS(1) [],
        /// Digital noise filter
        DNF OFFSET(0) NUMBITS(4) []
    ]
];
