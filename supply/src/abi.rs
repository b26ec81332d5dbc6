//! Contract bindings and their method descriptors.
//!
//! The `sol!` bindings are what actually encode calldata. The descriptor
//! tables restate each method's name, parameters and return type so that a
//! drift between the two is caught once at startup by [`validate_bindings`]
//! instead of surfacing as a revert on-chain.

use crate::error::SupplyError;
use alloy::{primitives::keccak256, sol, sol_types::SolCall};
use std::fmt;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IPool {
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbiType {
    Address,
    Bool,
    Uint8,
    Uint16,
    Uint256,
}

impl AbiType {
    pub const fn canonical_name(self) -> &'static str {
        match self {
            AbiType::Address => "address",
            AbiType::Bool => "bool",
            AbiType::Uint8 => "uint8",
            AbiType::Uint16 => "uint16",
            AbiType::Uint256 => "uint256",
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    View,
    NonPayable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: &'static str,
    pub inputs: &'static [AbiType],
    pub output: Option<AbiType>,
    pub mutability: Mutability,
}

impl MethodSpec {
    /// Canonical signature, e.g. `approve(address,uint256)`.
    pub fn signature(&self) -> String {
        let inputs: Vec<&str> = self.inputs.iter().map(|t| t.canonical_name()).collect();
        format!("{}({})", self.name, inputs.join(","))
    }

    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ContractInterface {
    pub name: &'static str,
    pub methods: &'static [MethodSpec],
}

impl ContractInterface {
    pub fn method(&self, name: &str) -> Option<&'static MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }
}

pub const ERC20_DECIMALS: MethodSpec = MethodSpec {
    name: "decimals",
    inputs: &[],
    output: Some(AbiType::Uint8),
    mutability: Mutability::View,
};

pub const ERC20_BALANCE_OF: MethodSpec = MethodSpec {
    name: "balanceOf",
    inputs: &[AbiType::Address],
    output: Some(AbiType::Uint256),
    mutability: Mutability::View,
};

pub const ERC20_ALLOWANCE: MethodSpec = MethodSpec {
    name: "allowance",
    inputs: &[AbiType::Address, AbiType::Address],
    output: Some(AbiType::Uint256),
    mutability: Mutability::View,
};

pub const ERC20_APPROVE: MethodSpec = MethodSpec {
    name: "approve",
    inputs: &[AbiType::Address, AbiType::Uint256],
    output: Some(AbiType::Bool),
    mutability: Mutability::NonPayable,
};

pub const POOL_SUPPLY: MethodSpec = MethodSpec {
    name: "supply",
    inputs: &[
        AbiType::Address,
        AbiType::Uint256,
        AbiType::Address,
        AbiType::Uint16,
    ],
    output: None,
    mutability: Mutability::NonPayable,
};

pub const ERC20: ContractInterface = ContractInterface {
    name: "ERC20",
    methods: &[ERC20_DECIMALS, ERC20_BALANCE_OF, ERC20_ALLOWANCE, ERC20_APPROVE],
};

pub const LENDING_POOL: ContractInterface = ContractInterface {
    name: "Pool",
    methods: &[POOL_SUPPLY],
};

/// Signature and selector the `sol!` bindings compiled for each method.
fn bound_methods() -> [(&'static ContractInterface, &'static str, &'static str, [u8; 4]); 5] {
    [
        (
            &ERC20,
            "decimals",
            IERC20::decimalsCall::SIGNATURE,
            IERC20::decimalsCall::SELECTOR,
        ),
        (
            &ERC20,
            "balanceOf",
            IERC20::balanceOfCall::SIGNATURE,
            IERC20::balanceOfCall::SELECTOR,
        ),
        (
            &ERC20,
            "allowance",
            IERC20::allowanceCall::SIGNATURE,
            IERC20::allowanceCall::SELECTOR,
        ),
        (
            &ERC20,
            "approve",
            IERC20::approveCall::SIGNATURE,
            IERC20::approveCall::SELECTOR,
        ),
        (
            &LENDING_POOL,
            "supply",
            IPool::supplyCall::SIGNATURE,
            IPool::supplyCall::SELECTOR,
        ),
    ]
}

/// Checks every descriptor against the compiled bindings.
pub fn validate_bindings() -> Result<(), SupplyError> {
    let bound = bound_methods();
    for (interface, method, signature, selector) in bound {
        let spec = interface
            .method(method)
            .ok_or_else(|| SupplyError::BindingMismatch {
                contract: interface.name,
                method,
                expected: "a descriptor".to_string(),
                actual: "none".to_string(),
            })?;
        if spec.signature() != signature || spec.selector() != selector {
            return Err(SupplyError::BindingMismatch {
                contract: interface.name,
                method,
                expected: spec.signature(),
                actual: signature.to_string(),
            });
        }
    }

    for interface in [&ERC20, &LENDING_POOL] {
        for spec in interface.methods {
            let has_binding = bound
                .iter()
                .any(|(bound_interface, method, ..)| {
                    bound_interface.name == interface.name && *method == spec.name
                });
            if !has_binding {
                return Err(SupplyError::BindingMismatch {
                    contract: interface.name,
                    method: spec.name,
                    expected: spec.signature(),
                    actual: "no binding".to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_match_descriptors() {
        validate_bindings().unwrap();
    }

    #[test]
    fn test_signatures() {
        assert_eq!(ERC20_APPROVE.signature(), "approve(address,uint256)");
        assert_eq!(ERC20_DECIMALS.signature(), "decimals()");
        assert_eq!(
            POOL_SUPPLY.signature(),
            "supply(address,uint256,address,uint16)"
        );
    }

    #[test]
    fn test_well_known_selectors() {
        // approve(address,uint256) = 0x095ea7b3, balanceOf(address) = 0x70a08231
        assert_eq!(ERC20_APPROVE.selector(), [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(ERC20_BALANCE_OF.selector(), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(ERC20_DECIMALS.selector(), [0x31, 0x3c, 0xe5, 0x67]);
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(ERC20.method("approve"), Some(&ERC20_APPROVE));
        assert!(LENDING_POOL.method("approveAndDeposit").is_none());
    }
}
