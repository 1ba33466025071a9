//! ButterStick r1.0: LFE5U-25F, DDR3, RGMII Ethernet, ULPI USB and three
//! SYZYGY ports.

use boardkit_platform::{
    button_resources, spi_flash_resources, ulpi_resource, Attrs, Clock, Connector,
    DefinitionError, Direction, FactoryOptions, PinSet, Pins, Platform, PlatformDef,
    ProgramCommand, Resource, SpiFlashPins, Stage, Subsignal, Toolchain, UlpiPins,
};

/// Registry name.
pub const NAME: &str = "butterstick_r1_0";

fn io_type(value: &str) -> Attrs {
    Attrs::new().with("IO_TYPE", value)
}

fn resources() -> Result<Vec<Resource>, DefinitionError> {
    let mut resources = vec![
        Resource::new("clk", 0, Pins::new("B12", Direction::In))
            .with_clock(Clock::mhz(30.0))
            .with_attrs(io_type("LVCMOS33")),
        // Reloads the FPGA configuration; holding button 0 enters the USB bootloader.
        Resource::new("program", 0, Pins::inverted("R3", Direction::Out))
            .with_attrs(io_type("LVCMOS33")),
    ];

    resources.extend(button_resources(
        PinSet::indexed([(0, "U16"), (1, "T17")]),
        &FactoryOptions::new()
            .invert(true)
            .attrs(io_type("SSTL135_I")),
    )?);

    // Flash DI (dq0) is wired to W2 and DO (dq1) to V2.
    resources.extend(spi_flash_resources(
        0,
        &SpiFlashPins {
            cs_n: "R2".to_string(),
            clk: "U3".to_string(),
            copi: "W2".to_string(),
            cipo: "V2".to_string(),
            wp_n: Some("Y2".to_string()),
            hold_n: Some("W1".to_string()),
        },
        &FactoryOptions::new().attrs(io_type("LVCMOS33")),
    )?);

    resources.push(
        Resource::group(
            "ddr3",
            0,
            vec![
                Subsignal::new("rst", Pins::inverted("E17", Direction::Out)),
                Subsignal::new("clk", Pins::diff_pairs("C20 J19", "D19 K19", Direction::Out))
                    .with_attrs(io_type("SSTL135D_I")),
                Subsignal::new("clk_en", Pins::new("F18 J18", Direction::Out)),
                Subsignal::new("cs", Pins::inverted("J20 J16", Direction::Out)),
                Subsignal::new("we", Pins::inverted("G19", Direction::Out)),
                Subsignal::new("ras", Pins::inverted("K18", Direction::Out)),
                Subsignal::new("cas", Pins::inverted("J17", Direction::Out)),
                Subsignal::new(
                    "a",
                    Pins::new(
                        "G16 E19 E20 F16 F19 E16 F17 L20 M20 E18 G18 D18 H18 C18 D17 G20",
                        Direction::Out,
                    ),
                ),
                Subsignal::new("ba", Pins::new("H16 F20 H20", Direction::Out)),
                Subsignal::new("dqs", Pins::diff_pairs("T19 N16", "R18 M18", Direction::InOut))
                    .with_attrs(
                        io_type("SSTL135D_I")
                            .with("TERMINATION", "OFF")
                            .with("DIFFRESISTOR", "100"),
                    ),
                Subsignal::new(
                    "dq",
                    Pins::new(
                        "U19 T18 U18 R20 P18 P19 P20 N20 L19 L17 L16 R16 N18 R17 N17 P17",
                        Direction::InOut,
                    ),
                )
                .with_attrs(Attrs::new().with("TERMINATION", "75")),
                Subsignal::new("dm", Pins::new("U20 L18", Direction::Out)),
                Subsignal::new("odt", Pins::new("K20 H17", Direction::Out)),
            ],
        )
        .with_attrs(io_type("SSTL135_I").with("SLEWRATE", "FAST")),
    );

    resources.push(
        Resource::group(
            "eth_rgmii",
            0,
            vec![
                Subsignal::new("rst", Pins::inverted("B20", Direction::Out)),
                Subsignal::new("mdc", Pins::new("A19", Direction::Out)),
                Subsignal::new("mdio", Pins::new("D16", Direction::InOut)),
                Subsignal::new("tx_clk", Pins::new("E15", Direction::Out)),
                Subsignal::new("tx_ctl", Pins::new("D15", Direction::Out)),
                Subsignal::new("tx_data", Pins::new("C15 B16 A18 B19", Direction::Out)),
                Subsignal::new("rx_clk", Pins::new("D11", Direction::In)),
                Subsignal::new("rx_ctl", Pins::new("B18", Direction::In)),
                Subsignal::new("rx_data", Pins::new("A16 C17 B17 A17", Direction::In)),
            ],
        )
        .with_attrs(io_type("LVCMOS25")),
    );

    resources.push(ulpi_resource(
        0,
        &UlpiPins {
            data: "B9 C6 A7 E9 A8 D9 C10 C7".to_string(),
            clk: "B6".to_string(),
            dir: "A6".to_string(),
            nxt: "B8".to_string(),
            stp: "C8".to_string(),
            rst: Some("C9".to_string()),
            clk_dir: Direction::In,
            rst_invert: true,
        },
        &FactoryOptions::new().attrs(Attrs::new().with("IOSTANDARD", "LVCMOS18")),
    )?);

    Ok(resources)
}

fn connectors() -> Vec<Connector> {
    vec![
        Connector::new(
            "syzygy",
            0,
            [
                ("S0_D0_P", "G2"),
                ("S1_D1_P", "J3"),
                ("S2_D0_N", "F1"),
                ("S3_D1_N", "K3"),
                ("S4_D2_P", "J4"),
                ("S5_D3_P", "K2"),
                ("S6_D2_N", "J5"),
                ("S7_D3_N", "J1"),
                ("S8_D4_P", "N2"),
                ("S9_D5_P", "L3"),
                ("S10_D4_N", "M1"),
                ("S11_D5_N", "L2"),
                ("S12_D6_P", "N3"),
                ("S13_D7_P", "N4"),
                ("S14_D6_N", "M3"),
                ("S15_D7_N", "P5"),
                ("S16", "H1"),
                ("S17", "K5"),
                ("S18", "K4"),
                ("S19", "K1"),
                ("S20", "L4"),
                ("S21", "L1"),
                ("S22", "L5"),
                ("S23", "M4"),
                ("S24", "N1"),
                ("S25", "N5"),
                ("S26", "P3"),
                ("S28", "P4"),
                ("C2P_CLK_N", "P2"),
                ("C2P_CLK_P", "P1"),
                ("P2C_CLK_N", "G1"),
                ("P2C_CLK_P", "H2"),
            ],
        ),
        Connector::new(
            "syzygy",
            1,
            [
                ("S0_D0_P", "E4"),
                ("S1_D1_P", "A4"),
                ("S2_D0_N", "D5"),
                ("S3_D1_N", "A5"),
                ("S4_D2_P", "C4"),
                ("S5_D3_P", "B2"),
                ("S6_D2_N", "B4"),
                ("S7_D3_N", "C2"),
                ("S8_D4_P", "A2"),
                ("S9_D5_P", "C1"),
                ("S10_D5_N", "D1"),
                ("S11_D4_N", "B1"),
                ("S12_D6_P", "F4"),
                ("S13_D7_P", "D2"),
                ("S14_D6_N", "E3"),
                ("S15_D7_N", "E1"),
                ("S16", "B5"),
                ("S17", "E5"),
                ("S18", "F5"),
                ("S19", "C5"),
                ("S20", "B3"),
                ("S21", "A3"),
                ("S22", "D3"),
                ("S23", "C3"),
                ("S24", "H5"),
                ("S25", "G5"),
                ("S26", "H3"),
                ("S27", "H4"),
                ("C2P_CLK_N", "F3"),
                ("C2P_CLK_P", "G3"),
                ("P2C_CLK_N", "E2"),
                ("P2C_CLK_P", "F2"),
            ],
        ),
        Connector::new(
            "syzygy",
            2,
            [
                ("S0", "C11"),
                ("S1", "B11"),
                ("S2", "D6"),
                ("S3", "D7"),
                ("S4", "E6"),
                ("S5", "E7"),
                ("S6", "D8"),
                ("S7", "E8"),
                ("S8", "E10"),
                ("S9", "D10"),
                ("RX0_N", "Y6"),
                ("RX0_P", "Y5"),
                ("RX1_N", "Y8"),
                ("RX1_P", "Y7"),
                ("RX2_N", "Y15"),
                ("RX2_P", "Y14"),
                ("RX3_N", "Y17"),
                ("RX3_P", "Y16"),
                ("TX0_N", "W5"),
                ("TX0_P", "W4"),
                ("TX1_N", "W9"),
                ("TX1_P", "W8"),
                ("TX2_N", "W14"),
                ("TX2_P", "W13"),
                ("TX3_N", "W18"),
                ("TX3_P", "W17"),
                ("C2P_CLK_N", "B10"),
                ("C2P_CLK_P", "A9"),
                ("P2C_CLK_N", "A11"),
                ("P2C_CLK_P", "A10"),
                ("REFCLK_N", "Y12"),
                ("REFCLK_P", "Y11"),
            ],
        ),
    ]
}

fn toolchain() -> Toolchain {
    Toolchain::lattice_ecp5()
        .with_tool("dfu-suffix")
        .with_command(
            Stage::Finish,
            "{{tool dfu-suffix}} -v 1209 -p 5af0 -a {{name}}.bit",
        )
        .with_override("ecppack_opts", "--compress --freq 38.8")
        .with_programmer(ProgramCommand::dfu_util())
}

/// Builds the ButterStick r1.0 platform.
pub fn platform() -> Result<Platform, DefinitionError> {
    Platform::new(PlatformDef {
        name: NAME.to_string(),
        device: "LFE5U-25F".to_string(),
        package: "BG381".to_string(),
        speed: "8".to_string(),
        default_clock: "clk".to_string(),
        default_reset: None,
        resources: resources()?,
        connectors: connectors(),
        toolchain: toolchain(),
        ..PlatformDef::default()
    })
}
