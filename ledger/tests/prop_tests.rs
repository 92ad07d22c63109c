use proptest::prelude::*;

use stakegate_ledger::{
    Asset, LedgerConfig, ModuleStatus, StakeLedger, VoteInstruction, WithdrawalQueue,
};
use stakegate_nullables::{NullAsset, NullClock, NullModuleBank};
use stakegate_types::{Address, Amount, Timestamp};

const EPOCH_START: u64 = 1000;
const EPOCH_LEN: u64 = 100;

fn addr(name: &str) -> Address {
    Address::new(format!("stk_{name}"))
}

fn amt(n: u128) -> Amount {
    Amount::new(n)
}

proptest! {
    /// The delay line neither loses nor invents balance: everything
    /// scheduled is claimed exactly once, regardless of epoch gaps.
    #[test]
    fn delay_line_conserves_scheduled_amounts(
        schedules in proptest::collection::vec((0u64..10, 1u128..1_000), 1..25),
    ) {
        let mut queue = WithdrawalQueue::new(0);
        let mut epoch = 0u64;
        let mut scheduled = 0u128;
        let mut claimed = 0u128;

        for (gap, amount) in schedules {
            epoch += gap;
            claimed += queue.schedule(epoch, amt(amount)).unwrap().raw();
            scheduled += amount;
        }
        claimed += queue.normalize(epoch + 100).unwrap().raw();

        prop_assert_eq!(claimed, scheduled);
        prop_assert!(queue.is_empty());
    }

    /// Normalizing twice at the same epoch never claims twice.
    #[test]
    fn normalize_is_idempotent_within_an_epoch(
        amount in 1u128..10_000,
        gap in 1u64..20,
    ) {
        let mut queue = WithdrawalQueue::new(0);
        queue.schedule(0, amt(amount)).unwrap();
        let first = queue.normalize(gap).unwrap();
        let second = queue.normalize(gap).unwrap();
        prop_assert_eq!(second, Amount::ZERO);
        prop_assert!(first.raw() <= amount);
    }

    /// Ledger invariants hold across arbitrary interleavings of deposit,
    /// withdraw, delegate, (well-behaved) revoke, and claim, with random
    /// epoch gaps in between:
    ///   - unlocked <= total_locked
    ///   - queued   <= total_locked
    ///   - asset supply is conserved
    #[test]
    fn invariants_hold_across_random_operations(
        ops in proptest::collection::vec((0u8..5, 1u128..10_000, 0u64..6), 1..50),
    ) {
        let config = LedgerConfig::new(
            addr("vault"),
            Timestamp::new(EPOCH_START),
            EPOCH_LEN,
        ).unwrap();
        let mut vault = StakeLedger::new(config);
        let mut asset = NullAsset::new();
        let mut bank = NullModuleBank::new();
        let clock = NullClock::new(EPOCH_START);
        let alice = addr("alice");
        let module = addr("module");
        vault.set_module_status(module.clone(), ModuleStatus::Allowed);
        bank.add(module.clone());

        let mut minted = 0u128;

        for (op, amount, epoch_gap) in ops {
            clock.advance_epochs(epoch_gap, EPOCH_LEN);
            let now = clock.now();
            match op {
                0 => {
                    asset.mint(&alice, amt(amount));
                    asset.approve(&alice, vault.identity(), amt(amount)).unwrap();
                    minted += amount;
                    vault.deposit(&mut asset, &mut bank, &alice, amt(amount), &[], now).unwrap();
                }
                1 => {
                    // May exceed the unlocked balance; failure must leave
                    // the invariants intact.
                    let _ = vault.withdraw(
                        &mut asset, &mut bank, &alice, amt(amount), &alice, &[], now,
                    );
                }
                2 => {
                    let _ = vault.apply_votes(
                        &mut asset, &mut bank, &alice,
                        &[VoteInstruction::delegate(module.clone(), amt(amount))],
                        now,
                    );
                }
                3 => {
                    // Revoke only what the module actually holds, so the
                    // run models a well-behaved module.
                    let held = bank.get(&module).unwrap().delegated(&alice);
                    let back = amount.min(held);
                    if back > 0 {
                        vault.apply_votes(
                            &mut asset, &mut bank, &alice,
                            &[VoteInstruction::revoke(module.clone(), amt(back))],
                            now,
                        ).unwrap();
                    }
                }
                _ => {
                    vault.claim_matured(&mut asset, &alice, &alice, now).unwrap();
                }
            }

            let locked = vault.locked_balance(&alice);
            let unlocked = vault.unlocked_balance(&alice);
            let queued = vault.queued_total(&alice);
            prop_assert!(unlocked <= locked, "unlocked {} > locked {}", unlocked, locked);
            prop_assert!(queued <= locked, "queued {} > locked {}", queued, locked);
            prop_assert_eq!(asset.total_supply().raw(), minted);
        }
    }
}
