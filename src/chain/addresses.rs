//! Contract addresses for CCTP contracts and price feeds across all supported
//! chains.
//!
//! This module centralizes the address constants referenced by the chain
//! descriptor table. Mainnet values come from Circle's deployment list,
//! testnet values from the sandbox deployments.
//!
//! Reference: <https://developers.circle.com/stablecoins/evm-smart-contracts>

use alloy_primitives::{address, Address};

// TokenMessenger addresses

/// <https://etherscan.io/address/0xbd3fa81b58ba92a82136038b25adec7066af3155>
pub const ETHEREUM_TOKEN_MESSENGER: Address = address!("bd3fa81b58ba92a82136038b25adec7066af3155");

/// <https://arbiscan.io/address/0x19330d10D9Cc8751218eaf51E8885D058642E08A>
pub const ARBITRUM_TOKEN_MESSENGER: Address = address!("19330d10D9Cc8751218eaf51E8885D058642E08A");

/// <https://basescan.org/address/0x1682Ae6375C4E4A97e4B583BC394c861A46D8962>
pub const BASE_TOKEN_MESSENGER: Address = address!("1682Ae6375C4E4A97e4B583BC394c861A46D8962");

/// <https://snowtrace.io/address/0x6b25532e1060ce10cc3b0a99e5683b91bfde6982>
pub const AVALANCHE_TOKEN_MESSENGER: Address = address!("6b25532e1060ce10cc3b0a99e5683b91bfde6982");

/// <https://optimistic.etherscan.io/address/0x2B4069517957735bE00ceE0fadAE88a26365528f>
pub const OPTIMISM_TOKEN_MESSENGER: Address = address!("2B4069517957735bE00ceE0fadAE88a26365528f");

/// <https://polygonscan.com/address/0x9daF8c91AEFAE50b9c0E69629D3F6Ca40cA3B3FE>
pub const POLYGON_TOKEN_MESSENGER: Address = address!("9daF8c91AEFAE50b9c0E69629D3F6Ca40cA3B3FE");

/// Noble's CCTP module account, in its 20-byte form. Used verbatim inside
/// synthetic receive envelopes; there is no EVM contract behind it.
pub const NOBLE_TOKEN_MESSENGER: Address = address!("57d4eaf1091577a6b7d121202afbd2808134f117");

/// <https://sepolia.etherscan.io/address/0x9f3B8679c73C2Fef8b59B4f3444d4e156fb70AA5>
pub const SEPOLIA_TOKEN_MESSENGER: Address = address!("9f3B8679c73C2Fef8b59B4f3444d4e156fb70AA5");

/// <https://testnet.snowtrace.io/address/0xeb08f243e5d3fcff26a9e38ae5520a669f4019d0>
pub const FUJI_TOKEN_MESSENGER: Address = address!("eb08f243e5d3fcff26a9e38ae5520a669f4019d0");

// MessageTransmitter addresses

/// <https://etherscan.io/address/0x0a992d191deec32afe36203ad87d7d289a738f81>
pub const ETHEREUM_MESSAGE_TRANSMITTER: Address =
    address!("0a992d191deec32afe36203ad87d7d289a738f81");

/// <https://arbiscan.io/address/0xC30362313FBBA5cf9163F0bb16a0e01f01A896ca>
pub const ARBITRUM_MESSAGE_TRANSMITTER: Address =
    address!("C30362313FBBA5cf9163F0bb16a0e01f01A896ca");

/// <https://basescan.org/address/0xAD09780d193884d503182aD4588450C416D6F9D4>
pub const BASE_MESSAGE_TRANSMITTER: Address = address!("AD09780d193884d503182aD4588450C416D6F9D4");

/// <https://snowtrace.io/address/0x8186359af5f57fbb40c6b14a588d2a59c0c29880>
pub const AVALANCHE_MESSAGE_TRANSMITTER: Address =
    address!("8186359af5f57fbb40c6b14a588d2a59c0c29880");

/// <https://optimistic.etherscan.io/address/0x4d41f22c5a0e5c74090899e5a8fb597a8842b3e8>
pub const OPTIMISM_MESSAGE_TRANSMITTER: Address =
    address!("4d41f22c5a0e5c74090899e5a8fb597a8842b3e8");

/// <https://polygonscan.com/address/0xF3be9355363857F3e001be68856A2f96b4C39Ba9>
pub const POLYGON_MESSAGE_TRANSMITTER: Address =
    address!("F3be9355363857F3e001be68856A2f96b4C39Ba9");

/// <https://sepolia.etherscan.io/address/0x7865fAfC2db2093669d92c0F33AeEF291086BEFD>
pub const SEPOLIA_MESSAGE_TRANSMITTER: Address =
    address!("7865fAfC2db2093669d92c0F33AeEF291086BEFD");

/// <https://testnet.snowtrace.io/address/0xa9fb1b3009dcb79e2fe346c16a604b8fa8ae0a79>
pub const FUJI_MESSAGE_TRANSMITTER: Address = address!("a9fb1b3009dcb79e2fe346c16a604b8fa8ae0a79");

// USDC contracts

pub const ETHEREUM_USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
pub const ARBITRUM_USDC: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");
pub const BASE_USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const AVALANCHE_USDC: Address = address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E");
pub const OPTIMISM_USDC: Address = address!("0b2c639c533813f4aa9d7837caf62653d097ff85");
pub const POLYGON_USDC: Address = address!("3c499c542cef5e3811e1192ce70d8cc03d5c3359");
pub const SEPOLIA_USDC: Address = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");
pub const FUJI_USDC: Address = address!("5425890298aed601595a70ab815c96711a31bc65");

// Chainlink native/USD price feeds

/// ETH/USD on Ethereum mainnet
pub const ETHEREUM_NATIVE_USD_FEED: Address = address!("5f4eC3Df9cbd43714FE2740f5E3616155c5b8419");
/// ETH/USD on Arbitrum One
pub const ARBITRUM_NATIVE_USD_FEED: Address = address!("639Fe6ab55C921f74e7fac1ee960C0B6293ba612");
/// ETH/USD on Base
pub const BASE_NATIVE_USD_FEED: Address = address!("71041dddad3595F9CEd3DcCFBe3D1F4b0a16Bb70");
/// POL/USD feed (served from Arbitrum)
pub const POLYGON_NATIVE_USD_FEED: Address = address!("82BA56a2fADF9C14f17D08bc51bDA0bDB83A8934");
/// AVAX/USD on Avalanche C-Chain
pub const AVALANCHE_NATIVE_USD_FEED: Address = address!("0A77230d17318075983913bC2145DB16C7366156");
/// ETH/USD on Optimism
pub const OPTIMISM_NATIVE_USD_FEED: Address = address!("13e3Ee699D1909E989722E753853AE30b17e08c5");
/// ETH/USD on Sepolia
pub const SEPOLIA_NATIVE_USD_FEED: Address = address!("694AA1769357215DE4FAC081bf1f309aDC325306");
/// AVAX/USD on Fuji
pub const FUJI_NATIVE_USD_FEED: Address = address!("5498BB86BC934c8D34FDA08E81D444153d0D06aD");

// Relayer destination-caller accounts

pub const EVM_DESTINATION_CALLER: Address = address!("eB4EaE8072bF3e2608f05B6812CD95133BF71504");
pub const AVALANCHE_DESTINATION_CALLER: Address =
    address!("D54c1628F113dA05bE5048dF948bc8dade604911");
pub const NOBLE_DESTINATION_CALLER: &str = "noble1nejktfwd47h9hsku6fxtgaxe5hf4pjzz3rq6ek";

/// Canonical USDC denomination on Noble, as a 32-byte CCTP token identifier.
/// This is the value burn messages carry when the burn side is Noble.
pub const NOBLE_USDC_TOKEN_32: [u8; 32] = [
    0x48, 0x70, 0x39, 0xde, 0xbe, 0xdb, 0xf3, 0x2d, 0x26, 0x01, 0x37, 0xb0, 0xa6, 0xf6, 0x6b,
    0x90, 0x96, 0x2b, 0xec, 0x77, 0x72, 0x50, 0x91, 0x0d, 0x25, 0x37, 0x81, 0xde, 0x32, 0x6a,
    0x71, 0x6d,
];
