//! Contract interfaces used by the launch flow

use alloy_sol_types::sol;

// ─── Paired token / deployed memecoin ───────────────────────────────────────
sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        event Transfer(address indexed from, address indexed to, uint256 amount);
        event Approval(address indexed owner, address indexed spender, uint256 amount);

        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

// ─── Launchpad ──────────────────────────────────────────────────────────────
sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    interface ILaunchpad {
        event TokenLaunched(
            address indexed tokenAddress,
            address indexed creator,
            string name,
            string symbol,
            uint256 initialSupply
        );
        event LiquidityAdded(
            address indexed tokenAddress,
            address indexed pairedToken,
            uint256 memecoinAmount,
            uint256 pairedTokenAmount
        );

        function launchToken(
            string memory name,
            string memory symbol,
            uint256 initialSupply,
            address pairedToken,
            uint256 liquidityMemecoinAmount,
            uint256 liquidityPairedTokenAmount
        ) external returns (address tokenAddress);
    }
}
