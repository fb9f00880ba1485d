#![no_main]

use arbitrary::Arbitrary;
use farm::{FarmContract, FarmContractClient};
use libfuzzer_sys::fuzz_target;
use reward_token::{RewardTokenContract, RewardTokenContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::StellarAssetClient,
    Address, Env, String,
};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Advance { blocks: u8 },
    Deposit { user: u8, amount: u32 },
    Withdraw { user: u8, amount: u32 },
    Touch { user: u8 },
    EmergencyWithdraw { user: u8 },
    Settle,
}

// Drives the farm's public surface with arbitrary action sequences, looking
// for unhandled panics (overflow, division by zero, broken storage
// assumptions) and checking the score-accounting invariant at the end.
fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let dev = Address::generate(&env);

    let reward_id = env.register(RewardTokenContract, ());
    let reward = RewardTokenContractClient::new(&env, &reward_id);
    reward.initialize(
        &admin,
        &String::from_str(&env, "Grain Token"),
        &String::from_str(&env, "GRN"),
        &7u32,
        &1_000_000_000_000i128,
    );

    let farm_id = env.register(FarmContract, ());
    let client = FarmContractClient::new(&env, &farm_id);
    client.initialize(&admin, &reward_id, &dev, &50i128, &100u32, &10_000u32, &10_000u32);
    reward.add_minter(&admin, &farm_id);

    let lp = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let issuer = StellarAssetClient::new(&env, &lp.address());
    client.add_pool(
        &admin,
        &lp.address(),
        &100i128,
        &1_000i128,
        &3i128,
        &500u32,
        &10u32,
        &true,
    );

    let mut users = std::vec::Vec::new();
    for _ in 0..4 {
        let user = Address::generate(&env);
        issuer.mint(&user, &1_000_000_000i128);
        users.push(user);
    }

    let mut height: u32 = 90;
    env.ledger().set_sequence_number(height);

    for action in actions {
        match action {
            FuzzAction::Advance { blocks } => {
                height = height.saturating_add(blocks as u32);
                env.ledger().set_sequence_number(height);
            }
            FuzzAction::Deposit { user, amount } => {
                let caller = &users[user as usize % users.len()];
                let _ = client.try_deposit(caller, &0, &(amount as i128));
            }
            FuzzAction::Withdraw { user, amount } => {
                let caller = &users[user as usize % users.len()];
                let _ = client.try_withdraw(caller, &0, &(amount as i128));
            }
            FuzzAction::Touch { user } => {
                let caller = &users[user as usize % users.len()];
                let _ = client.try_deposit(caller, &0, &0i128);
            }
            FuzzAction::EmergencyWithdraw { user } => {
                let caller = &users[user as usize % users.len()];
                let _ = client.try_emergency_withdraw(caller, &0);
            }
            FuzzAction::Settle => {
                let _ = client.try_settle(&0);
            }
        }
    }

    // Score accounting must balance no matter the action order.
    let pool = client.get_pool(&0);
    let mut score_sum: i128 = 0;
    for user in &users {
        let position = client.get_position(&0, user);
        assert!(position.amount >= 0);
        assert!(position.score >= position.amount || position.amount == 0);
        score_sum += position.score;
    }
    assert_eq!(pool.total_score, score_sum);
});
