use ethers::prelude::*;

// Deployed BuyMeACoffee ABI
abigen!(
    BuyMeACoffee,
    r#"[
        struct Memo { address from; uint256 timestamp; string name; string message; }
        function buyCoffee(string _name, string _message) payable
        function getMemos() view returns (Memo[])
        event NewMemo(address indexed from, uint256 timestamp, string name, string message)
    ]"#
);

// First deployment address on a fresh local dev chain
pub const CONTRACT_ADDRESS: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
